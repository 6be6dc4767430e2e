//! End-to-end report pipeline
//!
//! deidentify → organize → chunk → enhance → recombine → reidentify
//!
//! Every step degrades instead of failing: a section whose enhancement errors keeps
//! its unenhanced text, and a table that cannot be persisted is reported in the log
//! while the run continues with the in-memory table.

use crate::chunking::{combine_chunks, Chunker};
use crate::config::DelilahConfig;
use crate::deidentify::{find_placeholders, Deidentifier};
use crate::domain::{Result, SessionId};
use crate::pipeline::enhancer::NarrativeEnhancer;
use crate::pipeline::guard::GenerationRegistry;
use crate::sections::{ContentOrganizer, DocumentRecord, OrganizedSections};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    /// Session the reference table belongs to
    pub session_id: SessionId,
    /// Where the reference table was written, if persisting succeeded
    pub table_path: Option<PathBuf>,
    /// Deidentified sections as handed to the enhancer
    pub deidentified: OrganizedSections,
    /// Final reidentified sections
    pub sections: OrganizedSections,
}

/// Runs documents through the full scrub / organize / enhance cycle
pub struct ReportPipeline {
    deidentifier: Arc<Deidentifier>,
    organizer: ContentOrganizer,
    chunker: Chunker,
    enhancer: Arc<dyn NarrativeEnhancer>,
    registry: GenerationRegistry,
    persist_table: bool,
}

impl ReportPipeline {
    /// Build a pipeline for a fresh session from configuration
    pub fn new(config: &DelilahConfig, enhancer: Arc<dyn NarrativeEnhancer>) -> Result<Self> {
        let deidentifier = Deidentifier::new(&config.deidentification)?;
        let organizer =
            ContentOrganizer::from_sections(&config.sections, config.chunking.context_lines);
        let chunker = Chunker::from_config(&config.chunking)?;
        Ok(Self::with_components(
            Arc::new(deidentifier),
            organizer,
            chunker,
            enhancer,
        ))
    }

    /// Build a pipeline from explicit components
    pub fn with_components(
        deidentifier: Arc<Deidentifier>,
        organizer: ContentOrganizer,
        chunker: Chunker,
        enhancer: Arc<dyn NarrativeEnhancer>,
    ) -> Self {
        Self {
            deidentifier,
            organizer,
            chunker,
            enhancer,
            registry: GenerationRegistry::new(),
            persist_table: true,
        }
    }

    /// Skip writing the reference table to the store
    pub fn without_persistence(mut self) -> Self {
        self.persist_table = false;
        self
    }

    /// The session's deidentifier
    pub fn deidentifier(&self) -> &Deidentifier {
        &self.deidentifier
    }

    /// The pipeline's generation registry
    pub fn registry(&self) -> &GenerationRegistry {
        &self.registry
    }

    /// Run the pipeline over a document set
    pub fn run(&self, documents: &[DocumentRecord]) -> ReportOutput {
        let start = Instant::now();
        let session_id = self.deidentifier.session_id().clone();
        tracing::info!(session_id = %session_id, documents = documents.len(), "Report pipeline started");

        let scrubbed: Vec<DocumentRecord> = documents
            .iter()
            .map(|d| DocumentRecord::new(d.name.clone(), self.deidentifier.deidentify(&d.text)))
            .collect();

        let table_path = if self.persist_table {
            match self.deidentifier.persist() {
                Ok(path) => Some(path),
                Err(e) => {
                    crate::log_error_with_context!(e, "Reference table not persisted");
                    None
                }
            }
        } else {
            None
        };

        let deidentified = self.organizer.organize_parallel(&scrubbed);

        let enhanced = thread::scope(|s| {
            let handles: Vec<_> = deidentified
                .iter()
                .map(|(name, text)| (name, text, s.spawn(move || self.generate_section(name, text))))
                .collect();

            let mut enhanced = deidentified.clone();
            for (name, text, handle) in handles {
                let output = handle.join().unwrap_or_else(|_| {
                    tracing::error!(section = %name, "Section generation panicked; keeping input");
                    text.to_string()
                });
                enhanced.set(name, output);
            }
            enhanced
        });

        let sections = self.deidentifier.reidentify_sections(&enhanced, None);

        tracing::info!(
            session_id = %session_id,
            sections = sections.non_empty().count(),
            duration_ms = start.elapsed().as_millis(),
            "Report pipeline completed"
        );

        ReportOutput {
            session_id,
            table_path,
            deidentified,
            sections,
        }
    }

    /// Enhance one deidentified section, chunking it when oversized
    pub fn generate_section(&self, section: &str, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let Some(_guard) = self.registry.try_acquire(section, text) else {
            tracing::warn!(section, "Section already being generated; keeping input");
            return text.to_string();
        };

        if !self.chunker.needs_split(text) {
            return self.enhance_chunk(section, text);
        }

        let chunks = self.chunker.split_text(text);
        crate::log_chunking!(section, text.chars().count(), chunks.len());

        let enhanced: Vec<String> = chunks
            .iter()
            .map(|chunk| self.enhance_chunk(section, chunk))
            .collect();
        combine_chunks(&enhanced)
    }

    fn enhance_chunk(&self, section: &str, chunk: &str) -> String {
        match self.enhancer.enhance(section, chunk) {
            Ok(output) if !output.trim().is_empty() => {
                let dropped = find_placeholders(chunk)
                    .into_iter()
                    .filter(|p| !output.contains(p))
                    .count();
                if dropped > 0 {
                    tracing::warn!(section, dropped, "Enhanced text dropped placeholders");
                }
                output
            }
            Ok(_) => {
                tracing::warn!(section, "Enhancer returned blank text; keeping input");
                chunk.to_string()
            }
            Err(e) => {
                tracing::warn!(section, error = %e, "Enhancement failed; keeping input");
                chunk.to_string()
            }
        }
    }
}
