//! Process command implementation
//!
//! Runs the full report pipeline with the pass-through enhancer, which is useful for
//! checking section coverage and the scrub/restore cycle on real documents.

use super::organize::print_sections;
use super::read_documents;
use crate::config::DelilahConfig;
use crate::pipeline::{PassThroughEnhancer, ReportPipeline};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Plain-text documents, in contribution order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print the full run output (deidentified and final sections) as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessArgs {
    /// Execute the process command
    pub fn execute(&self, config: &DelilahConfig) -> anyhow::Result<i32> {
        let Some(documents) = read_documents(&self.inputs) else {
            return Ok(5);
        };

        let pipeline = match ReportPipeline::new(config, Arc::new(PassThroughEnhancer)) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ Failed to build pipeline");
                eprintln!("   Error: {e}");
                return Ok(2);
            }
        };

        let output = pipeline.run(&documents);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_sections(&output.sections);
        }

        eprintln!(
            "✅ Processed {} document(s) into {} section(s)",
            documents.len(),
            output.sections.non_empty().count()
        );
        eprintln!("   Session: {}", output.session_id);
        match output.table_path {
            Some(ref path) => eprintln!("   Reference table: {}", path.display()),
            None => eprintln!("   Reference table: not saved (see log)"),
        }
        Ok(0)
    }
}
