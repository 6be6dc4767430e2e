//! Reidentify command implementation

use super::write_output;
use crate::config::DelilahConfig;
use crate::deidentify::ReferenceTableStore;
use crate::domain::{DelilahError, SessionId};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the reidentify command
#[derive(Args, Debug)]
pub struct ReidentifyArgs {
    /// Text containing placeholders
    pub input: PathBuf,

    /// Session whose reference table restores the originals
    #[arg(short, long)]
    pub session: String,

    /// Write the restored text here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReidentifyArgs {
    /// Execute the reidentify command
    pub fn execute(&self, config: &DelilahConfig) -> anyhow::Result<i32> {
        tracing::info!(session_id = %self.session, "Reidentifying document");

        let session = match self.session.parse::<SessionId>() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Invalid session id");
                eprintln!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = ReferenceTableStore::new(config.deidentification.table_dir());
        let table = match store.load(&session) {
            Ok(t) => t,
            Err(DelilahError::TableNotFound(path)) => {
                eprintln!("❌ No reference table for session {session}");
                eprintln!("   Looked for: {path}");
                eprintln!("   Run 'delilah tables' to list stored sessions");
                return Ok(5);
            }
            Err(e) => {
                eprintln!("❌ Failed to load reference table");
                eprintln!("   Error: {e}");
                return Ok(5);
            }
        };

        let text = match fs::read_to_string(&self.input) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("❌ Failed to read {}", self.input.display());
                eprintln!("   Error: {e}");
                return Ok(5);
            }
        };

        let restored = table.reidentify(&text);
        if let Err(e) = write_output(self.output.as_deref(), &restored) {
            eprintln!("❌ Failed to write output");
            eprintln!("   Error: {e}");
            return Ok(5);
        }

        eprintln!(
            "✅ Restored text using {} placeholder(s) from session {session}",
            table.len()
        );
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deidentify::ReferenceTable;

    fn config_with_tables(dir: &std::path::Path) -> DelilahConfig {
        let mut config = DelilahConfig::default();
        config.deidentification.reference_table_dir = Some(dir.to_path_buf());
        config
    }

    #[test]
    fn test_reidentify_from_stored_table() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionId::new("20240115_103000").unwrap();
        let table: ReferenceTable = [("[NAME_abc12345]".to_string(), "Jane Doe".to_string())]
            .into_iter()
            .collect();
        ReferenceTableStore::new(dir.path()).save(&session, &table).unwrap();

        let input = dir.path().join("draft.txt");
        let output = dir.path().join("final.txt");
        fs::write(&input, "[NAME_abc12345] returned to work.").unwrap();

        let args = ReidentifyArgs {
            input,
            session: session.to_string(),
            output: Some(output.clone()),
        };
        assert_eq!(args.execute(&config_with_tables(dir.path())).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "Jane Doe returned to work."
        );
    }

    #[test]
    fn test_reidentify_unknown_session() {
        let dir = tempfile::tempdir().unwrap();
        let args = ReidentifyArgs {
            input: dir.path().join("draft.txt"),
            session: "20990101_000000".to_string(),
            output: None,
        };
        assert_eq!(args.execute(&config_with_tables(dir.path())).unwrap(), 5);
    }

    #[test]
    fn test_reidentify_rejects_path_like_session() {
        let dir = tempfile::tempdir().unwrap();
        let args = ReidentifyArgs {
            input: dir.path().join("draft.txt"),
            session: "../secrets".to_string(),
            output: None,
        };
        assert_eq!(args.execute(&config_with_tables(dir.path())).unwrap(), 2);
    }
}
