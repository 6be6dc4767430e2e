//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Delilah configuration file.

use crate::config::load_config_or_default;
use crate::deidentify::PatternRegistry;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<i32> {
        let shown = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(default lookup)".to_string());
        tracing::info!(config_path = %shown, "Validating configuration");

        println!("🔍 Validating configuration file: {shown}");
        println!();

        // Loading runs validation as well
        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // The pattern library is compiled here so regex errors surface before a run
        let registry = match config.deidentification.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        };
        let registry = match registry {
            Ok(r) => {
                println!("✅ Pattern library compiled");
                r.with_exclusions(&config.deidentification.exclusions)
            }
            Err(e) => {
                println!("❌ Pattern library failed to compile");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Reference Tables: {}",
            config.deidentification.table_dir().display()
        );
        println!(
            "  Pattern Library: {}",
            config
                .deidentification
                .pattern_library
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        );
        println!("  PHI Categories: {}", registry.categories().len());
        println!("  Exclusion Terms: {}", registry.exclusions().len());
        println!("  Audit Log: {}", config.deidentification.audit.enabled);
        println!("  Sections: {:?}", config.section_names());
        println!("  Max Chunk Size: {}", config.chunking.max_chunk_size);
        println!("  Chunk Overlap: {}", config.chunking.chunk_overlap);
        println!("  Context Lines: {}", config.chunking.context_lines);
        println!();
        Ok(0)
    }
}
