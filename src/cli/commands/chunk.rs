//! Chunk command implementation

use crate::chunking::Chunker;
use crate::config::DelilahConfig;
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the chunk command
#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Plain-text input file
    pub input: PathBuf,

    /// Print chunks as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl ChunkArgs {
    /// Execute the chunk command
    pub fn execute(&self, config: &DelilahConfig) -> anyhow::Result<i32> {
        let chunker = match Chunker::from_config(&config.chunking) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Invalid chunking configuration");
                eprintln!("   Error: {e}");
                return Ok(2);
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

        let chunks = chunker.split(&text);
        tracing::info!(
            chars = text.chars().count(),
            chunks = chunks.len(),
            "Text chunked"
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&chunks)?);
        } else {
            for chunk in &chunks {
                println!(
                    "--- Chunk {} ({} chars, {} overlap) ---",
                    chunk.index + 1,
                    chunk.char_len(),
                    chunk.overlap_chars
                );
                println!("{}", chunk.text);
                println!();
            }
        }

        eprintln!(
            "✅ {} chunk(s), max {} chars, overlap {}",
            chunks.len(),
            chunker.max_chunk_size(),
            chunker.chunk_overlap()
        );
        Ok(0)
    }
}
