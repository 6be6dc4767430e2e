//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod chunk;
pub mod deidentify;
pub mod init;
pub mod organize;
pub mod process;
pub mod reidentify;
pub mod tables;
pub mod validate;

use crate::sections::DocumentRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read plain-text documents, printing a ❌ line to stderr for the first unreadable one
pub(crate) fn read_documents(paths: &[PathBuf]) -> Option<Vec<DocumentRecord>> {
    read_documents_reporting(paths, &mut std::io::stderr())
}

/// Read plain-text documents, reporting the first failure to `status`
fn read_documents_reporting<W: Write>(
    paths: &[PathBuf],
    status: &mut W,
) -> Option<Vec<DocumentRecord>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match DocumentRecord::from_path(path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                let _ = writeln!(status, "❌ Failed to read {}", path.display());
                let _ = writeln!(status, "   Error: {e}");
                return None;
            }
        }
    }
    Some(documents)
}

/// Write `contents` to `output`, or to stdout when no output is given
pub(crate) fn write_output(output: Option<&Path>, contents: &str) -> std::io::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)
        }
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}
