//! Declarative word-list strategy
//!
//! Completes a token matched by a regular expression against a fixed
//! vocabulary. This is the strategy built from each `[[strategies]]` entry of
//! the configuration file.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde_json::json;
use tokio::runtime::Handle;
use tracing::debug;

use super::{CandidateRow, SearchResponder, SearchResult, Strategy, escape_markup};
use crate::config::StrategyConfig;
use crate::error::{Result, StrategyError};
use crate::surface::EditorSurface;

/// Word-list completion strategy
#[derive(Debug, Clone)]
pub struct WordListStrategy {
    name: String,
    trigger: Regex,
    index: Option<usize>,
    words: Arc<Vec<String>>,
    max_results: usize,
    latency: Duration,
    prefix: String,
    suffix: String,
}

impl WordListStrategy {
    /// Create a strategy triggered by `pattern`.
    ///
    /// # Arguments
    /// * `name` - Strategy name
    /// * `pattern` - Regular expression the whole scanned token must match
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let trigger = Regex::new(pattern).map_err(|e| StrategyError::InvalidTrigger {
            strategy: name.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name,
            trigger,
            index: None,
            words: Arc::new(Vec::new()),
            max_results: 8,
            latency: Duration::ZERO,
            prefix: String::new(),
            suffix: String::new(),
        })
    }

    /// Build a strategy from its configuration entry
    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        Ok(Self::new(config.name.clone(), &config.trigger)?
            .with_index(config.index)
            .with_words(config.words.iter().cloned())
            .with_max_results(config.max_results)
            .with_latency(config.latency())
            .with_affixes(config.prefix.clone(), config.suffix.clone()))
    }

    pub fn with_index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = Arc::new(words.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_affixes(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Words starting with `term` (case-insensitive), best matches first
    fn matching(words: &[String], term: &str, limit: usize) -> Vec<SearchResult> {
        let needle = term.to_lowercase();
        let mut matched: Vec<&String> = words
            .iter()
            .filter(|word| word.to_lowercase().starts_with(&needle))
            .collect();

        // Exact matches first, then shorter words, then alphabetical
        matched.sort_by(|a, b| {
            if !needle.is_empty() {
                let a_exact = a.to_lowercase() == needle;
                let b_exact = b.to_lowercase() == needle;
                if a_exact != b_exact {
                    return if a_exact {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                }
            }
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        });

        matched
            .into_iter()
            .take(limit)
            .map(|word| json!({ "value": word }))
            .collect()
    }
}

impl Strategy for WordListStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn trigger(&self, probe: &str) -> bool {
        self.trigger.is_match(probe)
    }

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn search(&self, term: &str, responder: SearchResponder) {
        if self.latency.is_zero() || Handle::try_current().is_err() {
            let results = Self::matching(&self.words, term, self.max_results);
            debug!(strategy = %self.name, term, count = results.len(), "search answered");
            responder.respond(Some(results));
            return;
        }

        let words = Arc::clone(&self.words);
        let term = term.to_string();
        let latency = self.latency;
        let limit = self.max_results;
        let name = self.name.clone();
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            let results = Self::matching(&words, &term, limit);
            debug!(strategy = %name, term = %term, count = results.len(), "delayed search answered");
            responder.respond(Some(results));
        });
    }

    fn template(&self, result: &SearchResult) -> String {
        let value = result
            .get("value")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| result.to_string());
        format!(
            "<span class=\"{}\">{}</span>",
            escape_markup(&self.name),
            escape_markup(&value)
        )
    }

    fn extract(&self, row: &CandidateRow) -> Option<String> {
        let text = row.visible_text();
        (!text.is_empty()).then_some(text)
    }

    fn replace(&self, editor: &mut dyn EditorSurface, text: &str, position: usize) {
        let replacement = format!("{}{}{}", self.prefix, text, self.suffix);
        editor.insert_text(position, &replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SessionId;
    use crate::surface::MemoryEditor;
    use tokio::sync::mpsc;

    fn mention() -> WordListStrategy {
        WordListStrategy::new("mention", r"^@\w*$")
            .unwrap()
            .with_index(Some(1))
            .with_words(["alice", "albert", "al", "bob"])
            .with_affixes("@", " ")
    }

    fn values(results: &[SearchResult]) -> Vec<&str> {
        results
            .iter()
            .map(|r| r["value"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_trigger_matches_whole_token() {
        let strategy = mention();
        assert!(strategy.trigger("@"));
        assert!(strategy.trigger("@wo"));
        assert!(!strategy.trigger("wo"));
        assert!(!strategy.trigger("x@wo"));
        assert!(!strategy.trigger("@w o"));
    }

    #[test]
    fn test_invalid_trigger() {
        let err = WordListStrategy::new("broken", "(").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_matching_orders_exact_then_length() {
        let strategy = mention();
        let results = WordListStrategy::matching(strategy.words(), "al", 8);
        assert_eq!(values(&results), vec!["al", "alice", "albert"]);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_limited() {
        let strategy = mention();
        let results = WordListStrategy::matching(strategy.words(), "AL", 2);
        assert_eq!(values(&results), vec!["al", "alice"]);

        let all = WordListStrategy::matching(strategy.words(), "", 8);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_search_without_latency_answers_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        mention().search("bo", SearchResponder::new(SessionId(3), tx));

        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.session, SessionId(3));
        assert_eq!(values(&delivery.results.unwrap()), vec!["bob"]);
    }

    #[tokio::test]
    async fn test_search_with_latency_answers_later() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let strategy = mention().with_latency(Duration::from_millis(5));
        strategy.search("ali", SearchResponder::new(SessionId(1), tx));

        assert!(rx.try_recv().is_err());
        let delivery = rx.recv().await.unwrap();
        assert_eq!(values(&delivery.results.unwrap()), vec!["alice"]);
    }

    #[test]
    fn test_template_and_extract() {
        let strategy = mention();
        let markup = strategy.template(&json!({ "value": "a<b" }));
        assert_eq!(markup, "<span class=\"mention\">a&lt;b</span>");
        let row = CandidateRow::new(0, markup);
        assert_eq!(strategy.extract(&row), Some("a<b".to_string()));
        assert_eq!(strategy.extract(&CandidateRow::new(1, "<span></span>")), None);
    }

    #[test]
    fn test_replace_inserts_affixes() {
        let mut editor = MemoryEditor::new("hello ");
        mention().replace(&mut editor, "alice", 6);
        assert_eq!(editor.text(), "hello @alice ");
        assert_eq!(editor.cursor_position(), 13);
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::Config::default();
        let strategy = WordListStrategy::from_config(&config.strategies[1]).unwrap();
        assert_eq!(strategy.name(), "tag");
        assert_eq!(strategy.index(), Some(1));
        assert!(strategy.trigger("#bu"));
    }
}
