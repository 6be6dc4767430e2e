//! Configuration schema types
//!
//! Every table is optional in the TOML file; missing values fall back to the
//! defaults below, so an empty `delilah.toml` is a valid configuration.

use crate::deidentify::store::default_table_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Main Delilah configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelilahConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// PHI scrubbing settings
    pub deidentification: DeidentificationConfig,

    /// Ordered section list with their keywords
    pub sections: Vec<SectionConfig>,

    /// Chunking and extraction parameters
    pub chunking: ChunkingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl DelilahConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.deidentification.validate()?;

        if self.sections.is_empty() {
            return Err("At least one [[sections]] entry is required".to_string());
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            section.validate()?;
            if !seen.insert(section.name.as_str()) {
                return Err(format!("Duplicate section name '{}'", section.name));
            }
        }

        self.chunking.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Names of the configured sections, in order
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for DelilahConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            deidentification: DeidentificationConfig::default(),
            sections: default_sections(),
            chunking: ChunkingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// PHI scrubbing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeidentificationConfig {
    /// Directory holding persisted reference tables (default `~/.delilah/reference_tables`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_table_dir: Option<PathBuf>,

    /// Custom pattern library; the built-in clinical library is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_library: Option<PathBuf>,

    /// Protected phrases added to the library's exclusion list
    pub exclusions: Vec<String>,

    /// Audit trail settings
    pub audit: AuditConfig,
}

impl DeidentificationConfig {
    /// Directory reference tables are stored in
    pub fn table_dir(&self) -> PathBuf {
        self.reference_table_dir
            .clone()
            .unwrap_or_else(default_table_dir)
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                return Err(format!(
                    "deidentification.pattern_library not found: {}",
                    path.display()
                ));
            }
        }
        if self.exclusions.iter().any(|e| e.trim().is_empty()) {
            return Err("deidentification.exclusions must not contain blank terms".to_string());
        }
        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Write an audit entry per deidentify call
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// JSON lines (true) or plain text (false)
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// One named report section and the keywords that locate it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Section name, used as the output key
    pub name: String,

    /// Keywords matched case-insensitively as substrings
    pub keywords: Vec<String>,
}

impl SectionConfig {
    /// Create a section from a name and keywords
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Section name cannot be empty".to_string());
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(format!(
                "Section '{}' must have at least one keyword",
                self.name
            ));
        }
        Ok(())
    }
}

/// Chunking and extraction parameters (character counts)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Largest chunk handed to the enhancement step
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Trailing context carried into the next chunk
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Lines kept after the densest line when no header is found
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl ChunkingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("chunking.max_chunk_size must be > 0".to_string());
        }
        if self.chunk_overlap >= self.max_chunk_size {
            return Err(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.max_chunk_size ({})",
                self.chunk_overlap, self.max_chunk_size
            ));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            context_lines: default_context_lines(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("logs/deidentification_audit.log")
}

fn default_max_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    250
}

fn default_context_lines() -> usize {
    crate::sections::extractor::DEFAULT_CONTEXT_LINES
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

/// Clinical assessment report sections used when none are configured
pub fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new(
            "background",
            ["background", "medical history", "pre-accident", "social history"],
        ),
        SectionConfig::new(
            "current_status",
            ["current status", "presenting", "complaints", "symptoms"],
        ),
        SectionConfig::new(
            "functional_observations",
            ["functional", "observation", "mobility", "transfers", "ambulation"],
        ),
        SectionConfig::new(
            "daily_living",
            ["activities of daily living", "self-care", "bathing", "dressing", "grooming"],
        ),
        SectionConfig::new(
            "cognitive_emotional",
            ["cognitive", "cognition", "memory", "mood", "emotional"],
        ),
        SectionConfig::new(
            "recommendations",
            ["recommendation", "treatment plan", "goals"],
        ),
    ]
}
