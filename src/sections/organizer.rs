//! Content organizer
//!
//! Runs the extractor over every document for every configured section and
//! accumulates the results per section, tagging each contribution with its source
//! document.

use crate::config::SectionConfig;
use crate::domain::Result;
use crate::sections::extractor::{Extraction, SectionExtractor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread;

/// One source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Document name shown in contribution delimiters
    pub name: String,
    /// Extracted plain text
    pub text: String,
}

impl DocumentRecord {
    /// Create a record from a name and text
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a plain-text document; the file name becomes the record name
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, text })
    }

    /// Document kind inferred from the name
    pub fn category(&self) -> DocumentCategory {
        DocumentCategory::from_file_name(&self.name)
    }
}

/// Kind of source document, inferred from its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentCategory {
    /// Assessment or evaluation notes and reports
    AssessmentNotes,
    /// File reviews and record histories
    FileReview,
    /// Medical and hospital documents
    MedicalDocuments,
    /// Anything else
    Other,
}

impl DocumentCategory {
    /// Classify a file name; the first matching group wins
    pub fn from_file_name(file_name: &str) -> Self {
        const ASSESSMENT: &[&str] = &["assessment", "eval", "notes", "report"];
        const FILE_REVIEW: &[&str] = &["file", "review", "history", "record", "documentation"];
        const MEDICAL: &[&str] = &["medical", "health", "clinical", "hospital", "discharge"];

        let name = file_name.to_lowercase();
        let matches = |terms: &[&str]| terms.iter().any(|t| name.contains(t));

        if matches(ASSESSMENT) {
            Self::AssessmentNotes
        } else if matches(FILE_REVIEW) {
            Self::FileReview
        } else if matches(MEDICAL) {
            Self::MedicalDocuments
        } else {
            Self::Other
        }
    }

    /// Snake-case name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssessmentNotes => "assessment_notes",
            Self::FileReview => "file_review",
            Self::MedicalDocuments => "medical_documents",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organized text per section, in configured order
///
/// Every configured section is present; sections nobody contributed to hold an
/// empty string. Serializes as a JSON object keyed by section name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizedSections {
    entries: Vec<(String, String)>,
}

impl OrganizedSections {
    /// Every named section with empty text
    pub fn empty<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: names.into_iter().map(|n| (n.into(), String::new())).collect(),
        }
    }

    /// Text for a section
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text.as_str())
    }

    /// Replace a section's text; returns false for an unknown section
    pub fn set(&mut self, name: &str, text: String) -> bool {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                entry.1 = text;
                true
            }
            None => false,
        }
    }

    /// (name, text) pairs in configured order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    /// Sections with non-empty text
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(_, text)| !text.is_empty())
    }

    /// Section names in configured order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sections are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `f` to every section's text, keeping names and order
    pub fn map_text<F>(&self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(n, t)| (n.clone(), f(t)))
                .collect(),
        }
    }
}

impl Serialize for OrganizedSections {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, text) in &self.entries {
            map.serialize_entry(name, text)?;
        }
        map.end()
    }
}

/// Append a document's contribution to a section buffer
fn append_contribution(buffer: &mut String, document: &str, text: &str) {
    if !buffer.is_empty() {
        buffer.push_str("\n\n");
    }
    buffer.push_str("--- From ");
    buffer.push_str(document);
    buffer.push_str(" ---\n\n");
    buffer.push_str(text);
}

/// Distributes document text into configured sections
#[derive(Debug, Clone)]
pub struct ContentOrganizer {
    extractor: SectionExtractor,
}

impl ContentOrganizer {
    /// Create an organizer around an extractor
    pub fn new(extractor: SectionExtractor) -> Self {
        Self { extractor }
    }

    /// Create an organizer for a section list
    pub fn from_sections(sections: &[SectionConfig], context_lines: usize) -> Self {
        Self::new(SectionExtractor::new(sections).with_context_lines(context_lines))
    }

    /// The extractor used per document
    pub fn extractor(&self) -> &SectionExtractor {
        &self.extractor
    }

    /// Organize documents sequentially
    ///
    /// Documents contribute in the order given; empty documents are skipped.
    pub fn organize(&self, documents: &[DocumentRecord]) -> OrganizedSections {
        let sections = self.extractor.sections();
        let mut organized = OrganizedSections::empty(sections.iter().map(|s| s.name.clone()));

        for document in documents.iter().filter(|d| !d.text.is_empty()) {
            tracing::debug!(
                document = %document.name,
                category = %document.category(),
                "Organizing document"
            );
            for (section, entry) in sections.iter().zip(organized.entries.iter_mut()) {
                if let Some(extraction) = self.extract_logged(section, document) {
                    append_contribution(&mut entry.1, &document.name, &extraction.text);
                }
            }
        }

        organized
    }

    /// Organize documents with one scoped thread per section
    ///
    /// Output is identical to [`organize`](Self::organize). A section whose worker
    /// panics is left empty.
    pub fn organize_parallel(&self, documents: &[DocumentRecord]) -> OrganizedSections {
        let sections = self.extractor.sections();
        let shared = Mutex::new(OrganizedSections::empty(
            sections.iter().map(|s| s.name.clone()),
        ));

        thread::scope(|s| {
            let handles: Vec<_> = sections
                .iter()
                .map(|section| {
                    let shared = &shared;
                    s.spawn(move || {
                        let mut buffer = String::new();
                        for document in documents.iter().filter(|d| !d.text.is_empty()) {
                            if let Some(extraction) = self.extract_logged(section, document) {
                                append_contribution(&mut buffer, &document.name, &extraction.text);
                            }
                        }
                        shared
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .set(&section.name, buffer);
                    })
                })
                .collect();

            for (section, handle) in sections.iter().zip(handles) {
                if handle.join().is_err() {
                    tracing::error!(section = %section.name, "Section worker panicked");
                }
            }
        });

        shared.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn extract_logged(&self, section: &SectionConfig, document: &DocumentRecord) -> Option<Extraction> {
        let extraction = self.extractor.locate(&document.text, &section.keywords)?;
        crate::log_section_extracted!(
            section.name,
            document.name,
            extraction.pass,
            extraction.line_count()
        );
        Some(extraction)
    }
}
