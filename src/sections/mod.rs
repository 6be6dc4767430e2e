//! Section partitioning of multi-document input
//!
//! [`SectionExtractor`] finds one section's span in one document; the
//! [`ContentOrganizer`] applies it across documents and sections and collects the
//! result into [`OrganizedSections`].

pub mod extractor;
pub mod organizer;

pub use extractor::{is_header_shaped, Extraction, ExtractionPass, SectionExtractor};
pub use organizer::{ContentOrganizer, DocumentCategory, DocumentRecord, OrganizedSections};
