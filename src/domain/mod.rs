//! Domain types shared across Delilah.
//!
//! - **Identifiers** ([`SessionId`])
//! - **Error types** ([`DelilahError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DelilahError>`]:
//!
//! ```rust,no_run
//! use delilah::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = delilah::config::load_config("delilah.toml")?;
//!     println!("{} sections configured", config.sections.len());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod result;

pub use errors::DelilahError;
pub use ids::SessionId;
pub use result::Result;
