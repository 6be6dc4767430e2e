// Delilah - Reversible PHI scrubbing for clinical report drafting
// Copyright (c) 2025 Delilah Contributors
// Licensed under the MIT License

use clap::Parser;
use delilah::cli::{Cli, Commands};
use delilah::config::{load_config_or_default, DelilahConfig, LoggingConfig};
use delilah::logging::init_logging;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // init and validate-config report configuration problems themselves
    let config = match cli.command {
        Commands::Init(_) | Commands::ValidateConfig(_) => None,
        _ => match load_config_or_default(cli.config.as_deref()) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("❌ Failed to load configuration");
                eprintln!("   Error: {e}");
                process::exit(2);
            }
        },
    };

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = match config {
        Some(ref c) => c.logging.clone(),
        None => LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        },
    };
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = delilah::VERSION, "Delilah starting");

    let exit_code = match execute_command(&cli, config.as_ref()) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush the file appender before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
fn execute_command(cli: &Cli, config: Option<&DelilahConfig>) -> anyhow::Result<i32> {
    if let Commands::Init(args) = &cli.command {
        return args.execute();
    }
    if let Commands::ValidateConfig(args) = &cli.command {
        return args.execute(cli.config.as_deref());
    }

    let config = config.ok_or_else(|| anyhow::anyhow!("configuration not loaded"))?;
    match &cli.command {
        Commands::Deidentify(args) => args.execute(config),
        Commands::Reidentify(args) => args.execute(config),
        Commands::Organize(args) => args.execute(config),
        Commands::Chunk(args) => args.execute(config),
        Commands::Process(args) => args.execute(config),
        Commands::Tables(args) => args.execute(config),
        Commands::Init(_) | Commands::ValidateConfig(_) => Ok(0),
    }
}
