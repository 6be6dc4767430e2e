//! Domain identifier types with validation

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used for new session identifiers
pub const SESSION_ID_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Length of the random tail appended to generated session identifiers
pub const SESSION_SUFFIX_LENGTH: usize = 6;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Session identifier newtype wrapper
///
/// Keys one reference table in durable storage. New sessions are stamped with the
/// local time down to the millisecond plus a short random tail
/// (`20250314_093012_481_k3x9q0`), so sessions started in the same instant still get
/// distinct tables. Any non-empty token that is safe to embed in a file name is
/// accepted so that externally named sessions can be reloaded.
///
/// # Examples
///
/// ```
/// use delilah::domain::ids::SessionId;
/// use std::str::FromStr;
///
/// let id = SessionId::from_str("20250314_093012").unwrap();
/// assert_eq!(id.as_str(), "20250314_093012");
/// assert!(SessionId::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(SessionId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Session ID cannot be empty".to_string());
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!(
                "Invalid session ID '{id}': only ASCII letters, digits, '_' and '-' are allowed"
            ));
        }
        Ok(Self(id))
    }

    /// Creates a unique session identifier stamped with the current local time
    ///
    /// Identifiers sort by creation time; the random tail only orders sessions
    /// created within the same millisecond.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SESSION_SUFFIX_LENGTH)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!(
            "{}_{suffix}",
            Local::now().format(SESSION_ID_FORMAT)
        ))
    }

    /// Returns the session ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
