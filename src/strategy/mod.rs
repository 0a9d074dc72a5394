//! Pluggable completion strategies
//!
//! A strategy bundles everything the core needs to know about one kind of
//! completion: which trailing text triggers it, how to search for candidates,
//! how to render a candidate row and how to write the chosen candidate back
//! into the document. The core treats each strategy as an opaque capability
//! and only calls it through [`Strategy`].

mod word_list;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::config::Config;
use crate::error::Result;
use crate::surface::EditorSurface;

pub use word_list::WordListStrategy;

/// One search result. The core never looks inside it.
pub type SearchResult = Value;

/// Shared handle to a strategy.
pub type StrategyRef = Arc<dyn Strategy>;

/// Identity of one autocomplete session.
///
/// Ids increase monotonically per controller, so a result carrying an old id
/// can always be told apart from one for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Search results addressed to the session that asked for them
#[derive(Debug, Clone)]
pub struct SearchDelivery {
    pub session: SessionId,
    pub results: Option<Vec<SearchResult>>,
}

/// Callback handle given to [`Strategy::search`].
///
/// Answering consumes the responder, so a strategy answers at most once per
/// search. It may answer immediately or from a spawned task; the controller
/// decides on receipt whether the answer is still wanted.
#[derive(Debug)]
pub struct SearchResponder {
    session: SessionId,
    tx: mpsc::UnboundedSender<SearchDelivery>,
}

impl SearchResponder {
    pub(crate) fn new(session: SessionId, tx: mpsc::UnboundedSender<SearchDelivery>) -> Self {
        Self { session, tx }
    }

    /// Session this search was issued for.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Deliver the results (or `None` when the search produced nothing).
    pub fn respond(self, results: Option<Vec<SearchResult>>) {
        let delivery = SearchDelivery {
            session: self.session,
            results,
        };
        if self.tx.send(delivery).is_err() {
            trace!(session = %self.session, "controller gone, dropping search results");
        }
    }
}

/// A rendered candidate row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub index: usize,
    pub markup: String,
}

impl CandidateRow {
    pub fn new(index: usize, markup: impl Into<String>) -> Self {
        Self {
            index,
            markup: markup.into(),
        }
    }

    /// Text a user would see for this row: tags removed, common entities
    /// decoded, surrounding whitespace trimmed.
    pub fn visible_text(&self) -> String {
        let mut text = String::with_capacity(self.markup.len());
        let mut in_tag = false;
        for c in self.markup.chars() {
            match c {
                '<' => in_tag = true,
                '>' if in_tag => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }
        decode_entities(text.trim())
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escape text for inclusion in row markup.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Trait implemented by every completion strategy
pub trait Strategy: Send + Sync {
    /// Name used in logs and configuration
    fn name(&self) -> &str;

    /// Whether `probe`, the text scanned backward from the cursor so far,
    /// is a token this strategy completes.
    fn trigger(&self, probe: &str) -> bool;

    /// Number of leading characters of the token to drop before searching.
    fn index(&self) -> Option<usize> {
        None
    }

    /// Look up candidates for `term` and answer through `responder`.
    fn search(&self, term: &str, responder: SearchResponder);

    /// Render one result into row markup.
    fn template(&self, result: &SearchResult) -> String;

    /// Recover the replacement text from a rendered row. `None` falls back to
    /// the row's visible text.
    fn extract(&self, _row: &CandidateRow) -> Option<String> {
        None
    }

    /// Insert `text` at `position`. The triggering token has already been
    /// removed from the document.
    fn replace(&self, editor: &mut dyn EditorSurface, text: &str, position: usize);
}

/// Build the configured strategies, in declaration order
pub fn from_config(config: &Config) -> Result<Vec<StrategyRef>> {
    config
        .strategies
        .iter()
        .map(|entry| Ok(Arc::new(WordListStrategy::from_config(entry)?) as StrategyRef))
        .collect()
}

impl fmt::Debug for dyn Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name())
            .field("index", &self.index())
            .finish()
    }
}
