//! Reversible PHI deidentification
//!
//! Detected PHI is replaced with opaque placeholders such as `[NAME_k3x9q0ab]`. Each
//! placeholder is recorded in a session-scoped [`ReferenceTable`] so the original
//! text can be restored once the deidentified draft comes back.
//!
//! - [`patterns`]: category rules and protected phrases loaded from TOML
//! - [`detector`]: candidate collection and overlap resolution
//! - [`placeholder`]: seedable placeholder ids
//! - [`table`] / [`store`]: the reference table and its JSON persistence
//! - [`audit`]: hashed audit trail of substitutions
//! - [`engine`]: the [`Deidentifier`] tying these together
//!
//! # Example
//!
//! ```no_run
//! use delilah::deidentify::{Deidentifier, PatternRegistry, PlaceholderGenerator, ReferenceTableStore};
//!
//! let deidentifier = Deidentifier::with_registry(
//!     PatternRegistry::default_patterns().unwrap(),
//!     ReferenceTableStore::new("/tmp/delilah-tables"),
//! )
//! .with_generator(PlaceholderGenerator::seeded(7));
//!
//! let scrubbed = deidentifier.deidentify("Patient name: Jane Doe\nMRN: 00123456");
//! println!("{scrubbed}");
//! ```

pub mod audit;
pub mod detector;
pub mod engine;
pub mod models;
pub mod patterns;
pub mod placeholder;
pub mod store;
pub mod table;

pub use audit::AuditLogger;
pub use detector::{PhiDetector, RegexDetector};
pub use engine::Deidentifier;
pub use models::{DeidentifyOutcome, PhiCategory, PhiMatch};
pub use patterns::{CategoryDefinition, ExclusionList, PatternRegistry};
pub use placeholder::{find_placeholders, is_placeholder, PlaceholderGenerator};
pub use store::ReferenceTableStore;
pub use table::ReferenceTable;
