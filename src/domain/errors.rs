//! Domain error types
//!
//! All fallible library operations return [`DelilahError`]. None of these errors are
//! fatal to a report run: callers decide whether to degrade (empty table, unchunked
//! section) or abort.

use thiserror::Error;

/// Main Delilah error type
#[derive(Debug, Error)]
pub enum DelilahError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pattern library errors (unknown category, invalid regex, bad TOML)
    #[error("Pattern library error: {0}")]
    Pattern(String),

    /// No reference table stored under the requested session
    #[error("Reference table not found: {0}")]
    TableNotFound(String),

    /// Another session already stored a table under this id
    #[error("Reference table already exists: {0}")]
    TableExists(String),

    /// A placeholder was issued twice within one reference table
    #[error("Placeholder collision: {0}")]
    PlaceholderCollision(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl DelilahError {
    /// Whether the caller can continue with a safe fallback
    ///
    /// Only configuration and pattern errors indicate the engine itself could not be
    /// built; everything else degrades to "no table loaded" or "no substitution".
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_) | Self::Pattern(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DelilahError {
    fn from(err: std::io::Error) -> Self {
        DelilahError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DelilahError {
    fn from(err: serde_json::Error) -> Self {
        DelilahError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DelilahError {
    fn from(err: toml::de::Error) -> Self {
        DelilahError::Configuration(format!("TOML parse error: {err}"))
    }
}
