//! Trigger-driven autocomplete for text editors
//!
//! This library watches the text just before an editor's cursor for trigger
//! tokens (an `@mention`, a `#tag`, anything a [`Strategy`] recognizes),
//! asks the matching strategy for candidates and lets the user pick one from
//! a dropdown that replaces the token when committed.
//!
//! # Modules
//!
//! - `scanner`: Backward trigger scan from the cursor
//! - `session`: Session controller state machine
//! - `strategy`: Strategy trait and the word-list strategy
//! - `surface`: Editor and list abstractions plus in-memory implementations
//! - `input`: Key and window events routed to the controller
//! - `terminal`: Interactive crossterm host
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use autocomplete::input::Key;
//! use autocomplete::surface::{MemoryEditor, RecordingList};
//! use autocomplete::{Phase, SessionController, StrategyRef, WordListStrategy};
//!
//! # fn main() -> autocomplete::Result<()> {
//! let mention: StrategyRef = Arc::new(
//!     WordListStrategy::new("mention", r"^@\w*$")?
//!         .with_index(Some(1))
//!         .with_words(["alice", "albert"])
//!         .with_affixes("@", " "),
//! );
//!
//! let mut ctl = SessionController::new(
//!     vec![mention],
//!     MemoryEditor::new("hi @al"),
//!     RecordingList::new(),
//! );
//! assert_eq!(ctl.document_changed(), Phase::Listing);
//!
//! ctl.handle_key(Key::Enter);
//! assert_eq!(ctl.editor().text(), "hi @alice ");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod scanner;
pub mod session;
pub mod strategy;
pub mod surface;
pub mod terminal;

// Re-export commonly used types
pub use config::Config;
pub use error::{AutocompleteError, Result};
pub use scanner::{TriggerMatch, evaluate};
pub use session::{CommitOutcome, Phase, SessionController};
pub use strategy::{SearchResponder, SearchResult, Strategy, StrategyRef, WordListStrategy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
