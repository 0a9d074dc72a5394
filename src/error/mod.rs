//! Error handling for the autocomplete crate.
//!
//! The session controller and the trigger scanner never fail: every degraded
//! path there is a silent fallback to an inert state. The error types in this
//! module cover the fallible edges of the crate instead:
//! - Loading and validating configuration
//! - Building strategies from configuration (trigger compilation)
//! - Terminal I/O in the interactive demo
//!
//! # Example
//!
//! ```rust,no_run
//! use autocomplete::error::{AutocompleteError, ConfigError, Result};
//!
//! fn require_strategies(count: usize) -> Result<()> {
//!     if count == 0 {
//!         return Err(ConfigError::MissingField("strategies".into()).into());
//!     }
//!     Ok(())
//! }
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{AutocompleteError, ConfigError, Result, StrategyError};
