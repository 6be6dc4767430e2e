//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "delilah.toml")]
    pub output: PathBuf,

    /// Include every setting with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output.display(), "Initializing configuration file");

        println!("📝 Initializing Delilah configuration");
        println!();

        if self.output.exists() && !self.force {
            println!(
                "❌ Configuration file already exists: {}",
                self.output.display()
            );
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output.display());
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your sections and keywords", self.output.display());
                println!("  2. Validate configuration: delilah validate-config");
                println!("  3. Scrub a document: delilah deidentify notes.txt -o scrubbed.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Delilah Configuration File

[application]
log_level = "info"

[[sections]]
name = "background"
keywords = ["background", "medical history", "pre-accident", "social history"]

[[sections]]
name = "current_status"
keywords = ["current status", "presenting", "complaints", "symptoms"]

[[sections]]
name = "recommendations"
keywords = ["recommendation", "treatment plan", "goals"]

[chunking]
max_chunk_size = 2000
chunk_overlap = 250
"#
        .to_string()
    }

    /// Generate configuration with every setting documented
    fn generate_config_with_examples() -> String {
        r#"# Delilah Configuration File
#
# Any value may reference an environment variable as ${VAR_NAME}.
# DELILAH_<TABLE>_<KEY> environment variables override file values,
# e.g. DELILAH_CHUNKING_MAX_CHUNK_SIZE=1500.

[application]
# trace | debug | info | warn | error
log_level = "info"

[deidentification]
# Where ref_table_<session>.json files are written
# (default: ~/.delilah/reference_tables)
# reference_table_dir = "/var/lib/delilah/reference_tables"

# Custom pattern library; the built-in clinical patterns are used when unset
# pattern_library = "patterns/phi_patterns.toml"

# Extra phrases that must never be replaced, on top of the library's list
exclusions = ["Case Manager", "Rehabilitation Consultant"]

[deidentification.audit]
# One JSON line per deidentify call; originals are stored as SHA-256 hashes only
enabled = false
log_path = "logs/deidentification_audit.log"
json_format = true

# Sections in report order. A section is filled from every document that
# mentions one of its keywords, under a header or in a dense paragraph.

[[sections]]
name = "background"
keywords = ["background", "medical history", "pre-accident", "social history"]

[[sections]]
name = "current_status"
keywords = ["current status", "presenting", "complaints", "symptoms"]

[[sections]]
name = "functional_observations"
keywords = ["functional", "observation", "mobility", "transfers", "ambulation"]

[[sections]]
name = "daily_living"
keywords = ["activities of daily living", "self-care", "bathing", "dressing", "grooming"]

[[sections]]
name = "cognitive_emotional"
keywords = ["cognitive", "cognition", "memory", "mood", "emotional"]

[[sections]]
name = "recommendations"
keywords = ["recommendation", "treatment plan", "goals"]

[chunking]
# Characters per chunk handed to the enhancer
max_chunk_size = 2000
# Trailing characters repeated at the start of the next chunk
chunk_overlap = 250
# Lines kept after the best keyword line when a section has no header
context_lines = 15

[logging]
local_enabled = true
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_generated_configs_are_valid() {
        let minimal = parse_config(&InitArgs::generate_minimal_config()).unwrap();
        assert_eq!(minimal.sections.len(), 3);

        let full = parse_config(&InitArgs::generate_config_with_examples()).unwrap();
        assert_eq!(full.sections.len(), 6);
        assert_eq!(full.deidentification.exclusions.len(), 2);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("delilah.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.clone(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let args = InitArgs {
            output: output.clone(),
            with_examples: true,
            force: true,
        };
        assert_eq!(args.execute().unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[chunking]"));
    }
}
