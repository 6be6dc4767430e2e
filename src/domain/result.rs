//! Result type alias for Delilah

use super::errors::DelilahError;

/// Result type alias for Delilah operations
///
/// # Examples
///
/// ```
/// use delilah::domain::result::Result;
/// use delilah::domain::errors::DelilahError;
///
/// fn failing_function() -> Result<()> {
///     Err(DelilahError::Validation("Invalid input".to_string()))
/// }
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, DelilahError>;
