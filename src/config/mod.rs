//! Configuration management for Delilah.
//!
//! Delilah reads an optional `delilah.toml` with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DELILAH_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation with descriptive errors
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use delilah::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("delilah.toml")?;
//!
//! for section in &config.sections {
//!     println!("{}: {:?}", section.name, section.keywords);
//! }
//! println!("Max chunk size: {}", config.chunking.max_chunk_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DeidentificationConfig`] - Reference table directory, pattern library, exclusions, audit
//! - [`SectionConfig`] - Ordered report sections and their keywords
//! - [`ChunkingConfig`] - Chunk size, overlap and extraction context
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [deidentification]
//! reference_table_dir = "${HOME}/.delilah/reference_tables"
//! exclusions = ["Case Manager"]
//!
//! [[sections]]
//! name = "background"
//! keywords = ["background", "medical history"]
//!
//! [chunking]
//! max_chunk_size = 2000
//! chunk_overlap = 250
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_or_default, parse_config};
pub use schema::{
    default_sections, ApplicationConfig, AuditConfig, ChunkingConfig, DeidentificationConfig,
    DelilahConfig, LoggingConfig, SectionConfig,
};
