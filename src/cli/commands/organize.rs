//! Organize command implementation
//!
//! Partitions documents into the configured sections without scrubbing them.

use super::read_documents;
use crate::config::DelilahConfig;
use crate::sections::{ContentOrganizer, OrganizedSections};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the organize command
#[derive(Args, Debug)]
pub struct OrganizeArgs {
    /// Plain-text documents, in contribution order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print the sections as a JSON object
    #[arg(long)]
    pub json: bool,
}

impl OrganizeArgs {
    /// Execute the organize command
    pub fn execute(&self, config: &DelilahConfig) -> anyhow::Result<i32> {
        tracing::info!(documents = self.inputs.len(), "Organizing documents");

        let Some(documents) = read_documents(&self.inputs) else {
            return Ok(5);
        };
        for doc in &documents {
            tracing::debug!(document = %doc.name, category = %doc.category(), "Document loaded");
        }

        let organizer =
            ContentOrganizer::from_sections(&config.sections, config.chunking.context_lines);
        let sections = organizer.organize_parallel(&documents);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&sections)?);
        } else {
            print_sections(&sections);
        }

        eprintln!(
            "✅ Filled {} of {} section(s) from {} document(s)",
            sections.non_empty().count(),
            sections.len(),
            documents.len()
        );
        Ok(0)
    }
}

/// Print each section under a `== name ==` heading
pub(crate) fn print_sections(sections: &OrganizedSections) {
    for (name, text) in sections.iter() {
        println!("== {name} ==");
        if text.is_empty() {
            println!("(empty)");
        } else {
            println!("{text}");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_organize_reads_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("assessment_notes.txt");
        fs::write(&input, "BACKGROUND:\nInjured lifting boxes.").unwrap();

        let args = OrganizeArgs {
            inputs: vec![input],
            json: true,
        };
        assert_eq!(args.execute(&DelilahConfig::default()).unwrap(), 0);
    }

    #[test]
    fn test_organize_missing_input() {
        let args = OrganizeArgs {
            inputs: vec![PathBuf::from("/nonexistent/notes.txt")],
            json: false,
        };
        assert_eq!(args.execute(&DelilahConfig::default()).unwrap(), 5);
    }
}
