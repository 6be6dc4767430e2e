//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Delilah using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Delilah - reversible PHI scrubbing for clinical report drafting
#[derive(Parser, Debug)]
#[command(name = "delilah")]
#[command(version, about, long_about = None)]
#[command(author = "Delilah Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./delilah.toml when present)
    #[arg(short, long, env = "DELILAH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DELILAH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace PHI in a text file with placeholders and save the reference table
    Deidentify(commands::deidentify::DeidentifyArgs),

    /// Restore originals in a text file from a stored reference table
    Reidentify(commands::reidentify::ReidentifyArgs),

    /// Partition documents into configured sections
    Organize(commands::organize::OrganizeArgs),

    /// Split a text file into overlapping chunks
    Chunk(commands::chunk::ChunkArgs),

    /// Run documents through deidentify, organize, chunk and reidentify
    Process(commands::process::ProcessArgs),

    /// List stored reference tables
    Tables(commands::tables::TablesArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
