//! Autocomplete sessions
//!
//! A session is one autocomplete interaction, from the moment the scanner
//! recognizes a trigger token until the user commits a candidate or the
//! session is cancelled. [`SessionController`] owns the single live session
//! and moves it through its phases:
//!
//! ```text
//!  Idle ──trigger found──▶ Matched ──non-empty results──▶ Listing
//!   ▲                        │                              │
//!   └────no results / stale / cancel / commit ◀─────────────┘
//! ```
//!
//! Window listeners (outside pointer presses, scroll, resize) only have an
//! effect while a session is `Listing`; they are considered detached in every
//! other phase.

mod controller;

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::scanner::TriggerMatch;
use crate::strategy::{CandidateRow, SessionId};

pub use controller::SessionController;

/// Lifecycle phase of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No trigger recognized
    Idle,
    /// Trigger recognized, search pending
    Matched,
    /// Candidates rendered, menu interactive
    Listing,
}

/// Outcome of a commit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Token replaced; the session has ended.
    Committed { text: String, position: usize },
    /// Nothing to commit with (no text, or inconsistent token range). The
    /// session is left untouched.
    Aborted,
    /// No interactive menu to commit from.
    Inactive,
}

/// State of the live session
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    phase: Phase,
    strategy: usize,
    token: String,
    search_term: String,
    starting_position: usize,
    ending_position: usize,
    rows: Vec<CandidateRow>,
    focused: usize,
}

impl Session {
    fn new(id: SessionId, found: TriggerMatch) -> Self {
        Self {
            id,
            phase: Phase::Matched,
            strategy: found.strategy,
            token: found.token,
            search_term: found.search_term,
            starting_position: found.starting_position,
            ending_position: found.ending_position,
            rows: Vec::new(),
            focused: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the owning strategy in the controller's strategy list
    pub fn strategy_index(&self) -> usize {
        self.strategy
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn starting_position(&self) -> usize {
        self.starting_position
    }

    pub fn ending_position(&self) -> usize {
        self.ending_position
    }

    pub fn rows(&self) -> &[CandidateRow] {
        &self.rows
    }

    pub fn candidate_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the row holding keyboard focus
    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn is_menu_active(&self) -> bool {
        self.phase == Phase::Listing
    }
}
