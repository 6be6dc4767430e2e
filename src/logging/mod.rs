//! Logging and observability
//!
//! Structured logging with:
//! - Console output on stderr
//! - JSON file logging with rotation
//! - `RUST_LOG` filtering
//!
//! Log fields carry counts, section names and session ids. PHI values are never
//! logged.
//!
//! # Example
//!
//! ```no_run
//! use delilah::logging::init_logging;
//! use delilah::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(documents = 3, "Organizing documents");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a section extracted from one document
///
/// # Example
///
/// ```no_run
/// use delilah::log_section_extracted;
///
/// log_section_extracted!("background", "assessment_notes.txt", "header", 12);
/// ```
#[macro_export]
macro_rules! log_section_extracted {
    ($section:expr, $document:expr, $pass:expr, $lines:expr) => {
        tracing::debug!(
            section = %$section,
            document = %$document,
            pass = %$pass,
            lines = $lines,
            "Section extracted"
        );
    };
}

/// Log the completion of a deidentify call
///
/// # Example
///
/// ```no_run
/// use delilah::log_deidentify_complete;
/// use std::time::Duration;
///
/// log_deidentify_complete!("20240115_103000", 4, Duration::from_millis(3));
/// ```
#[macro_export]
macro_rules! log_deidentify_complete {
    ($session_id:expr, $substitutions:expr, $duration:expr) => {
        tracing::info!(
            session_id = %$session_id,
            substitutions = $substitutions,
            duration_ms = $duration.as_millis(),
            "Deidentification completed"
        );
    };
}

/// Log a section split into chunks
///
/// # Example
///
/// ```no_run
/// use delilah::log_chunking;
///
/// log_chunking!("background", 5400, 3);
/// ```
#[macro_export]
macro_rules! log_chunking {
    ($section:expr, $chars:expr, $chunks:expr) => {
        tracing::info!(
            section = %$section,
            chars = $chars,
            chunks = $chunks,
            "Section split into chunks"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use delilah::log_error_with_context;
/// use delilah::domain::DelilahError;
///
/// let error = DelilahError::TableNotFound("ref_table_x.json".to_string());
/// log_error_with_context!(&error, "Failed to load reference table");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
