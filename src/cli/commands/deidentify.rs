//! Deidentify command implementation
//!
//! Scrubs one plain-text file and persists the session's reference table so the
//! output can later be reidentified with `delilah reidentify --session <ID>`.
//!
//! Status lines go to stderr so the scrubbed text can be piped from stdout.

use super::write_output;
use crate::config::DelilahConfig;
use crate::deidentify::Deidentifier;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the deidentify command
#[derive(Args, Debug)]
pub struct DeidentifyArgs {
    /// Plain-text input file
    pub input: PathBuf,

    /// Write the scrubbed text here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DeidentifyArgs {
    /// Execute the deidentify command
    pub fn execute(&self, config: &DelilahConfig) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Deidentifying document");

        let text = match fs::read_to_string(&self.input) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("❌ Failed to read {}", self.input.display());
                eprintln!("   Error: {e}");
                return Ok(5);
            }
        };

        let deidentifier = match Deidentifier::new(&config.deidentification) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Failed to build deidentifier");
                eprintln!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let outcome = deidentifier.deidentify_with_outcome(&text);

        let table_path = match deidentifier.persist() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ Failed to save reference table");
                eprintln!("   Error: {e}");
                return Ok(5);
            }
        };

        if let Err(e) = write_output(self.output.as_deref(), &outcome.text) {
            eprintln!("❌ Failed to write output");
            eprintln!("   Error: {e}");
            return Ok(5);
        }

        eprintln!("✅ Replaced {} PHI span(s)", outcome.substitutions());
        for (category, count) in &outcome.by_category {
            eprintln!("   {category}: {count}");
        }
        eprintln!("   Session: {}", deidentifier.session_id());
        eprintln!("   Reference table: {}", table_path.display());
        if let Some(ref output) = self.output {
            eprintln!("   Output: {}", output.display());
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deidentify::ReferenceTableStore;

    #[test]
    fn test_deidentify_writes_output_and_table() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        let output = dir.path().join("scrubbed.txt");
        fs::write(&input, "Dr. Jane Doe reviewed the file.").unwrap();

        let mut config = DelilahConfig::default();
        config.deidentification.reference_table_dir = Some(dir.path().join("tables"));

        let args = DeidentifyArgs {
            input,
            output: Some(output.clone()),
        };
        assert_eq!(args.execute(&config).unwrap(), 0);

        let scrubbed = fs::read_to_string(output).unwrap();
        assert!(!scrubbed.contains("Jane Doe"));

        let store = ReferenceTableStore::new(dir.path().join("tables"));
        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        let table = store.load(&sessions[0]).unwrap();
        assert_eq!(table.reidentify(&scrubbed), "Dr. Jane Doe reviewed the file.");
    }

    #[test]
    fn test_deidentify_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = DeidentifyArgs {
            input: dir.path().join("missing.txt"),
            output: None,
        };
        assert_eq!(args.execute(&DelilahConfig::default()).unwrap(), 5);
    }
}
