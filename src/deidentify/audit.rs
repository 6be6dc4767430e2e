//! Audit logger for deidentification runs
//!
//! Each deidentify call appends one entry. Original values are recorded only as
//! SHA-256 hashes; plaintext PHI never reaches the audit file.

use crate::deidentify::models::{DeidentifyOutcome, PhiCategory};
use crate::domain::{DelilahError, Result, SessionId};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    session_id: &'a str,
    substitutions: usize,
    by_category: &'a BTreeMap<PhiCategory, usize>,
    value_hashes: Vec<String>,
}

/// Append-only audit logger
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a new audit logger, creating the parent directory if needed
    pub fn new(log_path: PathBuf, json_format: bool) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DelilahError::Io(format!(
                    "Failed to create audit log directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        Ok(Self {
            log_path,
            json_format,
            write_lock: Mutex::new(()),
        })
    }

    /// Record one deidentify call
    ///
    /// `originals` are the substituted values in the same order as
    /// `outcome.placeholders`.
    pub fn log_deidentification(
        &self,
        session: &SessionId,
        outcome: &DeidentifyOutcome,
        originals: &[String],
    ) -> Result<()> {
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            session_id: session.as_str(),
            substitutions: outcome.substitutions(),
            by_category: &outcome.by_category,
            value_hashes: originals.iter().map(|v| hash_phi_value(v)).collect(),
        };

        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                DelilahError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        if self.json_format {
            let json_line = serde_json::to_string(entry)?;
            writeln!(file, "{json_line}")?;
        } else {
            let categories: Vec<String> = entry
                .by_category
                .iter()
                .map(|(category, count)| format!("{category}={count}"))
                .collect();
            writeln!(
                file,
                "[{}] Session: {} | Substitutions: {} | {}",
                entry.timestamp,
                entry.session_id,
                entry.substitutions,
                categories.join(", ")
            )?;
        }

        Ok(())
    }
}

/// Hash a PHI value using SHA-256
pub fn hash_phi_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}
