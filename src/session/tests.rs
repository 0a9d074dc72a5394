use super::*;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::input::{Direction, Key, KeyDisposition, WindowEvent};
use crate::strategy::{
    SearchDelivery, SearchResponder, SearchResult, SessionId, Strategy, StrategyRef,
    WordListStrategy,
};
use crate::surface::{EditorSurface, ListOp, MemoryEditor, MenuPlacement, RecordingList};

type Controller = SessionController<MemoryEditor, RecordingList>;

fn mention() -> WordListStrategy {
    WordListStrategy::new("mention", r"^@\w*$")
        .unwrap()
        .with_index(Some(1))
        .with_words(["world", "wolf", "wombat", "alice"])
        .with_affixes("@", "")
}

fn tag() -> WordListStrategy {
    WordListStrategy::new("tag", r"^#\w*$")
        .unwrap()
        .with_index(Some(1))
        .with_words(["bug", "build"])
        .with_affixes("#", "")
}

fn controller(text: &str, cursor: usize) -> Controller {
    let strategies: Vec<StrategyRef> = vec![Arc::new(mention()), Arc::new(tag())];
    SessionController::new(
        strategies,
        MemoryEditor::new(text).with_cursor(cursor),
        RecordingList::new(),
    )
}

/// Strategy that parks its responders so tests decide when to answer
#[derive(Default)]
struct Deferred {
    pending: Mutex<Vec<(String, SearchResponder)>>,
    extract_nothing: bool,
}

impl Deferred {
    fn take(&self) -> Vec<(String, SearchResponder)> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}

impl Strategy for Deferred {
    fn name(&self) -> &str {
        "deferred"
    }

    fn trigger(&self, probe: &str) -> bool {
        probe.starts_with('@') && !probe.contains(' ')
    }

    fn index(&self) -> Option<usize> {
        Some(1)
    }

    fn search(&self, term: &str, responder: SearchResponder) {
        self.pending
            .lock()
            .unwrap()
            .push((term.to_string(), responder));
    }

    fn template(&self, result: &SearchResult) -> String {
        format!("<li>{}</li>", result.as_str().unwrap_or_default())
    }

    fn extract(&self, _row: &CandidateRow) -> Option<String> {
        if self.extract_nothing {
            Some(String::new())
        } else {
            None
        }
    }

    fn replace(&self, editor: &mut dyn EditorSurface, text: &str, position: usize) {
        editor.insert_text(position, text);
    }
}

fn deferred_controller(text: &str, strategy: Arc<Deferred>) -> Controller {
    SessionController::new(
        vec![strategy as StrategyRef],
        MemoryEditor::new(text),
        RecordingList::new(),
    )
}

fn answer(responder: SearchResponder, values: &[&str]) {
    responder.respond(Some(values.iter().map(|v| json!(v)).collect()));
}

#[test]
fn test_starts_idle() {
    let ctl = controller("", 0);
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(!ctl.is_active());
    assert!(!ctl.listening());
    assert!(ctl.rows().is_empty());
}

#[test]
fn test_match_renders_menu() {
    let mut ctl = controller("hello @wo", 9);
    assert_eq!(ctl.document_changed(), Phase::Listing);

    let session = ctl.session().unwrap();
    assert_eq!(session.search_term(), "wo");
    assert_eq!(session.token(), "@wo");
    assert_eq!(session.starting_position(), 6);
    assert_eq!(session.ending_position(), 8);
    assert_eq!(session.candidate_count(), 3);
    assert_eq!(ctl.focused_row(), Some(0));

    let list = ctl.list();
    assert!(list.is_visible());
    assert_eq!(list.rows().len(), 3);
    assert_eq!(list.focused(), Some(0));
    assert!(list.rows()[0].contains("wolf"));
}

#[test]
fn test_menu_placed_below_right_of_anchor() {
    let mut ctl = controller("hello @wo", 9).with_placement_offset(1, 0);
    ctl.document_changed();
    // Anchor is offset 8: left 8, width 1, top 0, height 1
    assert_eq!(
        ctl.list().placement(),
        Some(MenuPlacement { top: 1, left: 10 })
    );
}

/// Editor that never knows where its characters are on screen
struct Offscreen(MemoryEditor);

impl EditorSurface for Offscreen {
    fn document_text(&self) -> String {
        self.0.document_text()
    }

    fn cursor_position(&self) -> usize {
        self.0.cursor_position()
    }

    fn screen_rect_at(&self, _offset: usize) -> Option<crate::surface::Rect> {
        None
    }

    fn set_selected_range(&mut self, start: usize, end: usize) {
        self.0.set_selected_range(start, end)
    }

    fn delete_selected_forward(&mut self) {
        self.0.delete_selected_forward()
    }

    fn insert_text(&mut self, position: usize, text: &str) {
        self.0.insert_text(position, text)
    }

    fn focus(&mut self) {
        self.0.focus()
    }
}

#[test]
fn test_placement_skipped_without_rect() {
    let mut ctl = SessionController::new(
        vec![Arc::new(mention()) as StrategyRef],
        Offscreen(MemoryEditor::new("@wo")),
        RecordingList::new(),
    );
    ctl.document_changed();
    assert!(ctl.is_menu_active());
    assert_eq!(ctl.list().placement(), None);

    ctl.list_mut().clear_ops();
    ctl.handle_window_event(WindowEvent::Resize);
    assert!(ctl.list().ops().is_empty());
    assert!(ctl.is_menu_active());
}

#[test]
fn test_resize_ignored_when_idle() {
    let mut ctl = controller("", 0);
    ctl.handle_window_event(WindowEvent::Resize);
    assert!(ctl.list().ops().is_empty());
}

#[test]
fn test_cursor_zero_cancels() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    assert!(ctl.is_menu_active());

    ctl.editor_mut().set_cursor(0);
    assert_eq!(ctl.document_changed(), Phase::Idle);
    assert!(ctl.session().is_none());
    assert!(!ctl.list().is_visible());
    assert!(ctl.list().rows().is_empty());
}

#[test]
fn test_no_match_tears_down() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    ctl.editor_mut().type_char(' ');
    assert_eq!(ctl.document_changed(), Phase::Idle);
    assert!(!ctl.list().is_visible());
}

#[test]
fn test_empty_results_return_to_idle() {
    let mut ctl = controller("@zzz", 4);
    assert_eq!(ctl.document_changed(), Phase::Idle);
    assert!(!ctl.is_active());
    assert!(!ctl.list().is_visible());
}

#[test]
fn test_absent_results_return_to_idle() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("@a", strategy.clone());
    assert_eq!(ctl.document_changed(), Phase::Matched);

    let (_, responder) = strategy.take().pop().unwrap();
    responder.respond(None);
    assert_eq!(ctl.poll_results(), 0);
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn test_second_strategy_used_for_tags() {
    let mut ctl = controller("fix #bu", 7);
    ctl.document_changed();
    let session = ctl.session().unwrap();
    assert_eq!(session.strategy_index(), 1);
    assert_eq!(session.search_term(), "bu");
    assert_eq!(session.candidate_count(), 2);
}

#[test]
fn test_navigation_wraps() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    assert_eq!(ctl.rows().len(), 3);

    assert_eq!(ctl.navigate(Direction::Previous), Some(2));
    assert_eq!(ctl.navigate(Direction::Next), Some(0));
    assert_eq!(ctl.navigate(Direction::Next), Some(1));
    assert_eq!(ctl.navigate(Direction::Next), Some(2));
    assert_eq!(ctl.navigate(Direction::Next), Some(0));
    assert_eq!(ctl.list().focused(), Some(0));
}

#[test]
fn test_navigation_single_row_wraps_to_itself() {
    let mut ctl = controller("@ali", 4);
    ctl.document_changed();
    assert_eq!(ctl.rows().len(), 1);
    assert_eq!(ctl.navigate(Direction::Next), Some(0));
    assert_eq!(ctl.navigate(Direction::Previous), Some(0));
}

#[test]
fn test_navigation_without_menu() {
    let mut ctl = controller("plain", 5);
    ctl.document_changed();
    assert_eq!(ctl.navigate(Direction::Next), None);
}

#[test]
fn test_arrow_up_from_first_row() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    assert_eq!(ctl.handle_key(Key::ArrowUp), KeyDisposition::Consumed);
    assert_eq!(ctl.focused_row(), Some(2));
    assert_eq!(ctl.handle_key(Key::ArrowDown), KeyDisposition::Consumed);
    assert_eq!(ctl.focused_row(), Some(0));
}

#[test]
fn test_commit_replaces_token() {
    let mut ctl = controller("hello @wo", 9);
    ctl.document_changed();
    ctl.navigate(Direction::Next);
    let outcome = ctl.commit();

    assert_eq!(
        outcome,
        CommitOutcome::Committed {
            text: "world".to_string(),
            position: 6
        }
    );
    assert_eq!(ctl.editor().text(), "hello @world");
    assert_eq!(ctl.editor().cursor_position(), 12);
    assert!(ctl.editor().is_focused());
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(!ctl.list().is_visible());
}

#[test]
fn test_commit_token_in_middle_of_document() {
    let mut ctl = controller("hi @wo there", 6);
    ctl.document_changed();
    ctl.commit();
    assert_eq!(ctl.editor().text(), "hi @wolf there");
}

#[test]
fn test_enter_and_tab_commit() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    assert_eq!(ctl.handle_key(Key::Enter), KeyDisposition::Consumed);
    assert_eq!(ctl.editor().text(), "@wolf");

    let mut ctl = controller("#b", 2);
    ctl.document_changed();
    ctl.handle_key(Key::ArrowDown);
    assert_eq!(ctl.handle_key(Key::Tab), KeyDisposition::Consumed);
    assert_eq!(ctl.editor().text(), "#build");
    assert!(ctl.editor().is_focused());
}

#[test]
fn test_commit_with_inverted_range_is_noop() {
    let mut ctl = controller("hello @wo", 9);
    ctl.document_changed();
    {
        let session = ctl.session_mut().unwrap();
        session.starting_position = 8;
        session.ending_position = 6;
    }
    let revision = ctl.editor().revision();
    let ops = ctl.list().ops().len();

    assert_eq!(ctl.commit(), CommitOutcome::Aborted);
    assert_eq!(ctl.editor().text(), "hello @wo");
    assert_eq!(ctl.editor().revision(), revision);
    assert_eq!(ctl.phase(), Phase::Listing);
    assert_eq!(ctl.session().unwrap().starting_position(), 8);
    assert_eq!(ctl.list().ops().len(), ops);
}

#[test]
fn test_commit_without_text_is_noop() {
    let strategy = Arc::new(Deferred {
        extract_nothing: true,
        ..Deferred::default()
    });
    let mut ctl = deferred_controller("@a", strategy.clone());
    ctl.document_changed();
    let (_, responder) = strategy.take().pop().unwrap();
    answer(responder, &["alice"]);
    ctl.poll_results();

    assert_eq!(ctl.commit(), CommitOutcome::Aborted);
    assert_eq!(ctl.editor().text(), "@a");
    assert!(ctl.is_menu_active());
}

#[test]
fn test_commit_falls_back_to_visible_text() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("say @a", strategy.clone());
    ctl.document_changed();
    let (term, responder) = strategy.take().pop().unwrap();
    assert_eq!(term, "a");
    answer(responder, &["alice", "anna"]);
    ctl.poll_results();

    assert_eq!(
        ctl.commit_row(1),
        CommitOutcome::Committed {
            text: "anna".to_string(),
            position: 4
        }
    );
    assert_eq!(ctl.editor().text(), "say anna");
}

#[test]
fn test_commit_unknown_row() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    assert_eq!(ctl.commit_row(9), CommitOutcome::Aborted);
    assert!(ctl.is_menu_active());
}

#[test]
fn test_commit_when_idle() {
    let mut ctl = controller("", 0);
    assert_eq!(ctl.commit(), CommitOutcome::Inactive);
    assert_eq!(ctl.commit_row(0), CommitOutcome::Inactive);
}

#[test]
fn test_other_key_cancels_and_passes_through() {
    for key in [Key::Char('x'), Key::Escape, Key::Shift, Key::Other] {
        let mut ctl = controller("@wo", 3);
        ctl.document_changed();
        ctl.editor_mut().blur();

        assert_eq!(ctl.handle_key(key), KeyDisposition::PassThrough);
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(ctl.editor().is_focused());
        assert_eq!(ctl.editor().text(), "@wo");
    }
}

#[test]
fn test_keys_pass_through_without_menu() {
    let mut ctl = controller("abc", 3);
    ctl.document_changed();
    assert_eq!(ctl.handle_key(Key::ArrowDown), KeyDisposition::PassThrough);
    assert_eq!(ctl.handle_key(Key::Enter), KeyDisposition::PassThrough);
    assert!(!ctl.editor().is_focused());
}

#[test]
fn test_cancel_clears_everything() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    let revision = ctl.editor().revision();

    ctl.cancel();
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(ctl.list().rows().is_empty());
    assert!(!ctl.list().is_visible());
    assert_eq!(ctl.editor().revision(), revision);

    // Cancelling again is harmless
    ctl.cancel();
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn test_cancel_while_matched() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("@a", strategy.clone());
    ctl.document_changed();
    ctl.cancel();
    assert_eq!(ctl.phase(), Phase::Idle);

    let (_, responder) = strategy.take().pop().unwrap();
    answer(responder, &["alice"]);
    assert_eq!(ctl.poll_results(), 0);
    assert!(ctl.list().rows().is_empty());
}

#[test]
fn test_window_events() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    ctl.handle_window_event(WindowEvent::Resize);
    assert!(ctl.is_menu_active());
    assert!(matches!(ctl.list().ops().last(), Some(ListOp::Position(_))));

    ctl.handle_window_event(WindowEvent::ScrollWheel);
    assert_eq!(ctl.phase(), Phase::Idle);

    ctl.document_changed();
    ctl.handle_window_event(WindowEvent::PointerDownOutside);
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn test_window_events_ignored_when_not_listening() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("@a", strategy);
    ctl.document_changed();
    assert!(!ctl.listening());

    ctl.handle_window_event(WindowEvent::PointerDownOutside);
    assert_eq!(ctl.phase(), Phase::Matched);
}

#[test]
fn test_hover_moves_focus() {
    let mut ctl = controller("@wo", 3);
    ctl.document_changed();
    ctl.hover_row(2);
    assert_eq!(ctl.focused_row(), Some(2));
    ctl.hover_row(7);
    assert_eq!(ctl.focused_row(), Some(2));
    assert_eq!(
        ctl.commit(),
        CommitOutcome::Committed {
            text: "wombat".to_string(),
            position: 0
        }
    );
}

#[test]
fn test_stale_results_never_render() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("@a", strategy.clone());
    ctl.document_changed();
    let first = ctl.session().unwrap().id();

    ctl.editor_mut().type_char('l');
    ctl.document_changed();
    let second = ctl.session().unwrap().id();
    assert!(second > first);

    let mut pending = strategy.take();
    assert_eq!(pending.len(), 2);
    let (newer_term, newer) = pending.pop().unwrap();
    let (older_term, older) = pending.pop().unwrap();
    assert_eq!(older_term, "a");
    assert_eq!(newer_term, "al");

    answer(older, &["anna"]);
    assert_eq!(ctl.poll_results(), 0);
    assert_eq!(ctl.phase(), Phase::Matched);
    assert!(ctl.list().rows().is_empty());

    answer(newer, &["alice"]);
    assert_eq!(ctl.poll_results(), 1);
    assert_eq!(ctl.rows().len(), 1);
    assert!(ctl.rows()[0].markup.contains("alice"));
}

#[test]
fn test_delivery_for_unknown_session_is_dropped() {
    let mut ctl = controller("", 0);
    let applied = ctl.apply_delivery(SearchDelivery {
        session: SessionId(42),
        results: Some(vec![json!("x")]),
    });
    assert!(!applied);
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn test_new_session_discards_previous_menu() {
    let mut ctl = controller("@wo #b", 3);
    ctl.document_changed();
    assert_eq!(ctl.rows().len(), 3);

    ctl.editor_mut().set_cursor(6);
    ctl.document_changed();
    assert_eq!(ctl.session().unwrap().strategy_index(), 1);
    assert_eq!(ctl.list().rows().len(), 2);
}

#[test]
fn test_repeat_delivery_rerenders() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("@a", strategy.clone());
    ctl.document_changed();
    let id = ctl.session().unwrap().id();
    let (_, responder) = strategy.take().pop().unwrap();
    answer(responder, &["alice", "anna"]);
    ctl.poll_results();
    ctl.navigate(Direction::Next);

    assert!(ctl.apply_delivery(SearchDelivery {
        session: id,
        results: Some(vec![json!("amy")]),
    }));
    assert_eq!(ctl.list().rows().len(), 1);
    assert_eq!(ctl.focused_row(), Some(0));
}

#[tokio::test]
async fn test_delayed_results_arrive_through_queue() {
    let delayed = mention().with_latency(Duration::from_millis(5));
    let mut ctl: Controller = SessionController::new(
        vec![Arc::new(delayed) as StrategyRef],
        MemoryEditor::new("@wo"),
        RecordingList::new(),
    );

    assert_eq!(ctl.document_changed(), Phase::Matched);
    let delivery = ctl.next_delivery().await.unwrap();
    assert!(ctl.apply_delivery(delivery));
    assert_eq!(ctl.phase(), Phase::Listing);
}

#[tokio::test]
async fn test_settle_waits_for_results() {
    let delayed = mention().with_latency(Duration::from_millis(5));
    let mut ctl: Controller = SessionController::new(
        vec![Arc::new(delayed) as StrategyRef],
        MemoryEditor::new("@al"),
        RecordingList::new(),
    );
    ctl.document_changed();
    assert_eq!(ctl.settle(Duration::from_secs(5)).await, Phase::Listing);
}

#[test]
fn test_settle_times_out_on_silent_strategy() {
    let strategy = Arc::new(Deferred::default());
    let mut ctl = deferred_controller("@a", strategy);
    ctl.document_changed();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let phase = runtime.block_on(ctl.settle(Duration::from_millis(10)));
    assert_eq!(phase, Phase::Matched);
}

#[test]
fn test_settle_when_idle_returns_immediately() {
    let mut ctl = controller("", 0);
    assert_eq!(tokio_test::block_on(ctl.settle(Duration::ZERO)), Phase::Idle);
}
