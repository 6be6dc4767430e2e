//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::DelilahConfig;
use crate::domain::errors::DelilahError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "delilah.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DelilahConfig
/// 4. Applies environment variable overrides (DELILAH_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DelilahError::Configuration`] if the file cannot be read or parsed, a
/// referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use delilah::config::loader::load_config;
///
/// let config = load_config("delilah.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DelilahConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DelilahError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DelilahError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Loads `path` if given, else `./delilah.toml` if present, else built-in defaults
///
/// Environment overrides and validation apply in every case.
pub fn load_config_or_default(path: Option<&Path>) -> Result<DelilahConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    if fallback.exists() {
        return load_config(fallback);
    }

    let mut config = DelilahConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<DelilahConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: DelilahConfig = toml::from_str(&contents)
        .map_err(|e| DelilahError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &DelilahConfig) -> Result<()> {
    config.validate().map_err(|e| {
        DelilahError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DelilahError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        // Comment lines are copied verbatim
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DelilahError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using DELILAH_* prefix
///
/// Environment variables follow the pattern: DELILAH_<SECTION>_<KEY>
/// For example: DELILAH_CHUNKING_MAX_CHUNK_SIZE, DELILAH_LOGGING_LOCAL_PATH
fn apply_env_overrides(config: &mut DelilahConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("DELILAH_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Deidentification overrides
    if let Ok(val) = std::env::var("DELILAH_DEIDENTIFICATION_REFERENCE_TABLE_DIR") {
        config.deidentification.reference_table_dir = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("DELILAH_DEIDENTIFICATION_PATTERN_LIBRARY") {
        config.deidentification.pattern_library = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("DELILAH_DEIDENTIFICATION_AUDIT_ENABLED") {
        config.deidentification.audit.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("DELILAH_DEIDENTIFICATION_AUDIT_LOG_PATH") {
        config.deidentification.audit.log_path = PathBuf::from(val);
    }

    // Chunking overrides
    if let Ok(val) = std::env::var("DELILAH_CHUNKING_MAX_CHUNK_SIZE") {
        config.chunking.max_chunk_size = parse_number("DELILAH_CHUNKING_MAX_CHUNK_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("DELILAH_CHUNKING_CHUNK_OVERLAP") {
        config.chunking.chunk_overlap = parse_number("DELILAH_CHUNKING_CHUNK_OVERLAP", &val)?;
    }
    if let Ok(val) = std::env::var("DELILAH_CHUNKING_CONTEXT_LINES") {
        config.chunking.context_lines = parse_number("DELILAH_CHUNKING_CONTEXT_LINES", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("DELILAH_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("DELILAH_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("DELILAH_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn parse_number(var: &str, val: &str) -> Result<usize> {
    val.trim().parse().map_err(|_| {
        DelilahError::Configuration(format!("{var} must be a non-negative integer, got '{val}'"))
    })
}
