//! Trigger scanner
//!
//! Decides, from the document text and the cursor alone, whether the text just
//! before the cursor is a token one of the strategies completes. The scan
//! starts at the character before the cursor and walks backward one character
//! at a time, prepending each visited character to a probe string and offering
//! the probe to every strategy in declaration order:
//!
//! - a probe starting with a space ends the scan with no match
//! - walking past the document start ends the scan with no match
//! - the first strategy accepting the probe ends the scan with a match
//!
//! Because the scan stops at the first accepted probe, a shorter trailing
//! token always wins over a longer one further back.
//!
//! The scanner is a pure function. It does not touch session state; the
//! controller applies its result.

use serde::Serialize;
use tracing::trace;

use crate::strategy::StrategyRef;

/// A recognized trigger token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerMatch {
    /// Position of the accepting strategy in the strategy list
    pub strategy: usize,
    /// The probe string the strategy accepted
    pub token: String,
    /// Text submitted to the strategy's search (`token` minus `index` chars)
    pub search_term: String,
    /// Offset of the token's first character
    pub starting_position: usize,
    /// Offset of the token's last character (the character before the cursor)
    pub ending_position: usize,
}

/// Scan backward from `cursor` for a trigger token.
///
/// # Arguments
/// * `text` - Full document text
/// * `cursor` - Cursor offset, in characters
/// * `strategies` - Strategies in priority order
///
/// # Returns
/// * `Option<TriggerMatch>` - The match, or `None` when nothing triggers
pub fn evaluate(text: &str, cursor: usize, strategies: &[StrategyRef]) -> Option<TriggerMatch> {
    if cursor == 0 || strategies.is_empty() {
        return None;
    }

    let chars: Vec<char> = text.chars().collect();
    let ending_position = cursor - 1;
    if ending_position >= chars.len() {
        return None;
    }

    // Characters are collected back to front and reversed per probe.
    let mut reversed = String::new();
    let mut position = ending_position;
    loop {
        let visited = chars[position];
        if visited == ' ' {
            trace!(position, "scan stopped at space");
            return None;
        }
        reversed.push(visited);
        let probe: String = reversed.chars().rev().collect();
        trace!(position, probe = %probe, "scan step");

        if let Some(index) = strategies.iter().position(|s| s.trigger(&probe)) {
            let search_term = match strategies[index].index() {
                Some(skip) if skip > 0 => probe.chars().skip(skip).collect(),
                _ => probe.clone(),
            };
            return Some(TriggerMatch {
                strategy: index,
                token: probe,
                search_term,
                starting_position: position,
                ending_position,
            });
        }

        if position == 0 {
            trace!("scan reached document start");
            return None;
        }
        position -= 1;
    }
}
