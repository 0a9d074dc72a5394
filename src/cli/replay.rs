//! Scripted sessions over the in-memory editor
//!
//! `replay` types nothing itself: it places the cursor, lets the controller
//! scan, and then feeds named keys through the same routing an interactive
//! host uses. Keys the controller does not consume are applied to the editor,
//! and every document change triggers a rescan.

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::error::{AutocompleteError, Result};
use crate::input::{Key, KeyDisposition};
use crate::session::{Phase, SessionController};
use crate::strategy;
use crate::surface::{EditorSurface, MemoryEditor, RecordingList};

/// How long to wait for a strategy to answer after each step
const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Final state of a replayed session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplayReport {
    pub text: String,
    pub cursor: usize,
    pub phase: Phase,
    /// Visible text of the rows still on screen
    pub rows: Vec<String>,
    pub focused: Option<usize>,
}

/// Replay `keys` against `text`
///
/// # Arguments
/// * `config` - Configuration providing the strategies
/// * `text` - Initial document
/// * `cursor` - Initial cursor, end of document when `None`
/// * `keys` - Key names, see [`Key::from_name`]
pub async fn replay(
    config: &Config,
    text: &str,
    cursor: Option<usize>,
    keys: &[String],
) -> Result<ReplayReport> {
    let keys = keys
        .iter()
        .map(|name| {
            Key::from_name(name)
                .ok_or_else(|| AutocompleteError::Generic(format!("Unknown key: {name}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let editor = match cursor {
        Some(cursor) => MemoryEditor::new(text).with_cursor(cursor),
        None => MemoryEditor::new(text),
    };
    let mut ctl = SessionController::new(
        strategy::from_config(config)?,
        editor,
        RecordingList::new(),
    );

    ctl.document_changed();
    ctl.settle(SETTLE_TIMEOUT).await;

    for key in keys {
        let revision = ctl.editor().revision();
        if ctl.handle_key(key) == KeyDisposition::PassThrough {
            let editor = ctl.editor_mut();
            match key {
                Key::Char(c) => editor.type_char(c),
                Key::Backspace => editor.backspace(),
                _ => {}
            }
        }
        if ctl.editor().revision() != revision {
            ctl.document_changed();
            ctl.settle(SETTLE_TIMEOUT).await;
        }
    }

    Ok(ReplayReport {
        text: ctl.editor().text(),
        cursor: ctl.editor().cursor_position(),
        phase: ctl.phase(),
        rows: ctl.rows().iter().map(|row| row.visible_text()).collect(),
        focused: ctl.focused_row(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_replay_commit() {
        let report = replay(&Config::default(), "hello @al", None, &keys(&["down", "enter"]))
            .await
            .unwrap();
        assert_eq!(report.text, "hello @albert ");
        assert_eq!(report.cursor, 14);
        assert_eq!(report.phase, Phase::Idle);
        assert!(report.rows.is_empty());
    }

    #[tokio::test]
    async fn test_replay_leaves_menu_open() {
        let report = replay(&Config::default(), "#b", None, &keys(&["up"]))
            .await
            .unwrap();
        assert_eq!(report.phase, Phase::Listing);
        assert_eq!(report.rows, vec!["bug", "build"]);
        assert_eq!(report.focused, Some(1));
    }

    #[tokio::test]
    async fn test_replay_typing_narrows() {
        let report = replay(&Config::default(), "@", None, &keys(&["c"]))
            .await
            .unwrap();
        assert_eq!(report.text, "@c");
        assert_eq!(report.rows, vec!["carol"]);
    }

    #[tokio::test]
    async fn test_replay_cursor_in_middle() {
        let report = replay(&Config::default(), "@ev and more", Some(3), &keys(&["tab"]))
            .await
            .unwrap();
        assert_eq!(report.text, "@eve  and more");
    }

    #[tokio::test]
    async fn test_replay_with_latency() {
        let mut config = Config::default();
        config.strategies[0].latency_ms = 5;
        let report = replay(&config, "@da", None, &keys(&["enter"]))
            .await
            .unwrap();
        assert_eq!(report.text, "@dave ");
    }

    #[tokio::test]
    async fn test_replay_unknown_key() {
        let err = replay(&Config::default(), "", None, &keys(&["hyper"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("hyper"));
    }
}
