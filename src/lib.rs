// Delilah - Reversible PHI scrubbing for clinical report drafting
// Copyright (c) 2025 Delilah Contributors
// Licensed under the MIT License

//! # Delilah - Reversible PHI Scrubbing
//!
//! Delilah prepares clinical narrative for an external drafting step. It replaces
//! protected health information with opaque placeholders, partitions multi-document
//! input into report sections, splits oversized sections into overlapping chunks, and
//! restores the originals once the drafted text comes back.
//!
//! ## Architecture
//!
//! - [`deidentify`] - PHI detection, placeholders, reference tables, audit log
//! - [`sections`] - Section extraction and multi-document organization
//! - [`chunking`] - Size-bounded, overlapping chunking and recombination
//! - [`pipeline`] - End-to-end report run with generation guards
//! - [`domain`] - Error type and identifiers
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use delilah::config::DelilahConfig;
//! use delilah::deidentify::Deidentifier;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DelilahConfig::default();
//! let deidentifier = Deidentifier::new(&config.deidentification)?;
//!
//! let scrubbed = deidentifier.deidentify("Dr. Jane Doe assessed the client.");
//! assert!(!scrubbed.contains("Jane Doe"));
//!
//! // Keep the table so the drafted text can be restored later
//! let path = deidentifier.persist()?;
//! println!("Reference table written to {}", path.display());
//!
//! let restored = deidentifier.reidentify(&scrubbed);
//! assert_eq!(restored, "Dr. Jane Doe assessed the client.");
//! # Ok(())
//! # }
//! ```
//!
//! ## Sections
//!
//! ```rust
//! use delilah::config::SectionConfig;
//! use delilah::sections::{ContentOrganizer, DocumentRecord};
//!
//! let organizer = ContentOrganizer::from_sections(
//!     &[SectionConfig::new("background", ["background", "history"])],
//!     15,
//! );
//! let sections = organizer.organize(&[DocumentRecord::new(
//!     "notes.txt",
//!     "BACKGROUND:\nInjured at work in 2023.",
//! )]);
//! assert_eq!(
//!     sections.get("background"),
//!     Some("--- From notes.txt ---\n\nBACKGROUND:\nInjured at work in 2023.")
//! );
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod deidentify;
pub mod domain;
pub mod logging;
pub mod pipeline;
pub mod sections;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
