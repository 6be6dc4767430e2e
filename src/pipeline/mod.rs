//! Report generation pipeline
//!
//! Ties the deidentifier, organizer and chunker to an external
//! [`NarrativeEnhancer`], with a per-pipeline [`GenerationRegistry`] preventing the
//! same section content from being generated twice at once.

pub mod enhancer;
pub mod guard;
pub mod report;

pub use enhancer::{NarrativeEnhancer, PassThroughEnhancer};
pub use guard::{fingerprint, GenerationGuard, GenerationKey, GenerationRegistry};
pub use report::{ReportOutput, ReportPipeline};
