//! Session controller - mediates between scanner, strategies, editor and list

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::{CommitOutcome, Phase, Session};
use crate::input::{Direction, Key, KeyDisposition, WindowEvent};
use crate::scanner::{self, TriggerMatch};
use crate::strategy::{CandidateRow, SearchDelivery, SearchResponder, SessionId, StrategyRef};
use crate::surface::{EditorSurface, ListContainer, MenuPlacement};

/// Owns the autocomplete session for one editor
///
/// The controller is driven entirely by its host: document changes, key
/// presses, pointer and window events are fed in, and search results are
/// pulled from the controller's delivery queue with
/// [`poll_results`](Self::poll_results) or
/// [`next_delivery`](Self::next_delivery).
pub struct SessionController<E, L> {
    strategies: Vec<StrategyRef>,
    editor: E,
    list: L,
    session: Option<Session>,
    next_id: u64,
    placement_offset: (i32, i32),
    deliveries_tx: mpsc::UnboundedSender<SearchDelivery>,
    deliveries_rx: mpsc::UnboundedReceiver<SearchDelivery>,
}

impl<E: EditorSurface, L: ListContainer> SessionController<E, L> {
    /// Create a controller
    ///
    /// # Arguments
    /// * `strategies` - Strategies in priority order
    /// * `editor` - Editing surface the overlay is attached to
    /// * `list` - Container the candidate rows are rendered into
    pub fn new(strategies: Vec<StrategyRef>, editor: E, list: L) -> Self {
        let (deliveries_tx, deliveries_rx) = mpsc::unbounded_channel();
        Self {
            strategies,
            editor,
            list,
            session: None,
            next_id: 0,
            placement_offset: (0, 0),
            deliveries_tx,
            deliveries_rx,
        }
    }

    /// Shift every menu placement by a fixed offset
    pub fn with_placement_offset(mut self, dx: i32, dy: i32) -> Self {
        self.placement_offset = (dx, dy);
        self
    }

    /* ========================= Accessors ========================= */

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, Session::phase)
    }

    /// Whether a trigger is currently recognized
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a candidate list is rendered and interactive
    pub fn is_menu_active(&self) -> bool {
        self.phase() == Phase::Listing
    }

    /// Whether window-level listeners are attached
    pub fn listening(&self) -> bool {
        self.is_menu_active()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn focused_row(&self) -> Option<usize> {
        self.session
            .as_ref()
            .filter(|s| s.is_menu_active())
            .map(Session::focused)
    }

    pub fn rows(&self) -> &[CandidateRow] {
        self.session.as_ref().map(Session::rows).unwrap_or(&[])
    }

    pub fn strategies(&self) -> &[StrategyRef] {
        &self.strategies
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut L {
        &mut self.list
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /* ========================= Document changes ========================= */

    /// React to a document change: rescan at the cursor and start, replace
    /// or end the session.
    ///
    /// Results a strategy answers synchronously are rendered before this
    /// returns.
    pub fn document_changed(&mut self) -> Phase {
        let text = self.editor.document_text();
        let cursor = self.editor.cursor_position();

        self.list.hide();

        match scanner::evaluate(&text, cursor, &self.strategies) {
            Some(found) => self.start_session(found),
            None => {
                if let Some(session) = &self.session {
                    debug!(session = %session.id, cursor, "no trigger at cursor, ending session");
                }
                self.teardown();
            }
        }

        self.poll_results();
        self.phase()
    }

    fn start_session(&mut self, found: TriggerMatch) {
        // Starting over discards whatever the previous session rendered
        self.teardown();

        self.next_id += 1;
        let id = SessionId(self.next_id);
        let strategy = Arc::clone(&self.strategies[found.strategy]);
        let term = found.search_term.clone();

        debug!(
            session = %id,
            strategy = strategy.name(),
            token = %found.token,
            term = %term,
            start = found.starting_position,
            end = found.ending_position,
            "trigger matched"
        );

        self.session = Some(Session::new(id, found));
        strategy.search(&term, SearchResponder::new(id, self.deliveries_tx.clone()));
    }

    /* ========================= Search results ========================= */

    /// Apply every delivery already waiting in the queue.
    ///
    /// # Returns
    /// * `usize` - Number of deliveries that rendered a menu
    pub fn poll_results(&mut self) -> usize {
        let mut rendered = 0;
        while let Ok(delivery) = self.deliveries_rx.try_recv() {
            if self.apply_delivery(delivery) {
                rendered += 1;
            }
        }
        rendered
    }

    /// Wait for the next delivery. Pair with [`apply_delivery`](Self::apply_delivery).
    pub async fn next_delivery(&mut self) -> Option<SearchDelivery> {
        self.deliveries_rx.recv().await
    }

    /// Wait until the pending search (if any) is answered or `timeout` passes.
    pub async fn settle(&mut self, timeout: Duration) -> Phase {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.phase() == Phase::Matched {
            match tokio::time::timeout_at(deadline, self.deliveries_rx.recv()).await {
                Ok(Some(delivery)) => {
                    self.apply_delivery(delivery);
                }
                Ok(None) | Err(_) => {
                    debug!("search did not answer in time, session stays pending");
                    break;
                }
            }
        }
        self.phase()
    }

    /// Render search results if they belong to the live session.
    ///
    /// Results for any other session are stale and dropped. Empty or absent
    /// results end the session.
    ///
    /// # Returns
    /// * `bool` - True if a menu was rendered
    pub fn apply_delivery(&mut self, delivery: SearchDelivery) -> bool {
        let current = self.session.as_ref().map(Session::id);
        if current != Some(delivery.session) {
            debug!(
                delivery = %delivery.session,
                current = ?current,
                "discarding stale search results"
            );
            return false;
        }

        let results = match delivery.results {
            Some(results) if !results.is_empty() => results,
            _ => {
                debug!(session = %delivery.session, "search returned nothing, ending session");
                self.teardown();
                return false;
            }
        };

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let strategy = Arc::clone(&self.strategies[session.strategy]);

        self.list.clear();
        session.rows = results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let markup = strategy.template(result);
                self.list.append_row(&markup, index);
                CandidateRow::new(index, markup)
            })
            .collect();
        session.focused = 0;
        session.phase = Phase::Listing;

        debug!(
            session = %session.id,
            count = session.rows.len(),
            "menu rendered"
        );

        self.list.show();
        self.position_menu();
        self.list.focus_row(0);
        true
    }

    /* ========================= Menu interaction ========================= */

    /// Move focus to the previous or next row, wrapping around.
    ///
    /// # Returns
    /// * `Option<usize>` - Newly focused row, `None` without a menu
    pub fn navigate(&mut self, direction: Direction) -> Option<usize> {
        let session = self.session.as_mut().filter(|s| s.is_menu_active())?;
        let count = session.rows.len();
        if count == 0 {
            return None;
        }

        session.focused = match direction {
            Direction::Previous => (session.focused + count - 1) % count,
            Direction::Next => (session.focused + 1) % count,
        };
        trace!(session = %session.id, focused = session.focused, "focus moved");
        self.list.focus_row(session.focused);
        Some(session.focused)
    }

    /// Pointer hovering a row focuses it.
    pub fn hover_row(&mut self, index: usize) {
        let Some(session) = self.session.as_mut().filter(|s| s.is_menu_active()) else {
            return;
        };
        if index < session.rows.len() {
            session.focused = index;
            self.list.focus_row(index);
        }
    }

    /// Commit the focused row.
    pub fn commit(&mut self) -> CommitOutcome {
        match self.focused_row() {
            Some(index) => self.commit_row(index),
            None => CommitOutcome::Inactive,
        }
    }

    /// Replace the trigger token with the text of row `index`.
    ///
    /// The token range `[start, end + 1)` is selected and deleted, then the
    /// strategy inserts the replacement at `start`. When the row yields no
    /// text or the range is inconsistent nothing happens, and the session is
    /// left as it was.
    pub fn commit_row(&mut self, index: usize) -> CommitOutcome {
        let Some(session) = self.session.as_ref().filter(|s| s.is_menu_active()) else {
            return CommitOutcome::Inactive;
        };
        let Some(row) = session.rows.get(index) else {
            warn!(session = %session.id, index, "commit of a row that does not exist");
            return CommitOutcome::Aborted;
        };

        let strategy = Arc::clone(&self.strategies[session.strategy]);
        let text = strategy
            .extract(row)
            .unwrap_or_else(|| row.visible_text());
        let start = session.starting_position;
        let end = session.ending_position;

        if text.is_empty() || end < start {
            warn!(
                session = %session.id,
                start,
                end,
                empty = text.is_empty(),
                "commit aborted"
            );
            return CommitOutcome::Aborted;
        }

        debug!(session = %session.id, text = %text, position = start, "committing candidate");

        self.editor.set_selected_range(start, end + 1);
        self.editor.delete_selected_forward();
        strategy.replace(&mut self.editor, &text, start);

        self.teardown();
        self.editor.focus();

        CommitOutcome::Committed {
            text,
            position: start,
        }
    }

    /// End the session without touching the document.
    pub fn cancel(&mut self) {
        if let Some(session) = &self.session {
            debug!(session = %session.id, "session cancelled");
        }
        self.teardown();
    }

    /// Route a key press.
    ///
    /// Only an interactive menu looks at keys: arrows navigate, Enter and Tab
    /// commit, and anything else ends the session and is handed back to the
    /// editor.
    pub fn handle_key(&mut self, key: Key) -> KeyDisposition {
        if !self.is_menu_active() {
            return KeyDisposition::PassThrough;
        }

        match key {
            Key::ArrowUp => {
                self.navigate(Direction::Previous);
                KeyDisposition::Consumed
            }
            Key::ArrowDown => {
                self.navigate(Direction::Next);
                KeyDisposition::Consumed
            }
            Key::Enter | Key::Tab => {
                self.commit();
                self.editor.focus();
                KeyDisposition::Consumed
            }
            _ => {
                self.cancel();
                self.editor.focus();
                KeyDisposition::PassThrough
            }
        }
    }

    /// Route a window-level event. Ignored unless a menu is listening.
    pub fn handle_window_event(&mut self, event: WindowEvent) {
        if !self.listening() {
            return;
        }

        match event {
            WindowEvent::Resize => self.position_menu(),
            WindowEvent::PointerDownOutside | WindowEvent::ScrollWheel => self.cancel(),
        }
    }

    /* ========================= Internals ========================= */

    /// Place the menu below and right of the character before the cursor.
    fn position_menu(&mut self) {
        let Some(anchor) = self.editor.cursor_position().checked_sub(1) else {
            return;
        };
        if !self.list.is_rendered() {
            return;
        }
        let Some(rect) = self.editor.screen_rect_at(anchor) else {
            trace!(anchor, "no screen rectangle for anchor, skipping placement");
            return;
        };

        let (dx, dy) = self.placement_offset;
        self.list
            .position_at(MenuPlacement::below_right_of(rect).offset(dx, dy));
    }

    fn teardown(&mut self) {
        self.session = None;
        self.list.hide();
        self.list.clear();
    }
}
