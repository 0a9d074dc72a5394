//! Interactive terminal host
//!
//! Wires a [`SessionController`] to a one-line editor and a dropdown drawn
//! with `crossterm`. Terminal events and search deliveries are multiplexed on
//! one task with `tokio::select!`, so every controller call happens on the
//! same turn-based loop.

mod surface;

use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{ExecutableCommand, QueueableCommand};
use futures::StreamExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AutocompleteError, Result};
use crate::input::{Key, KeyDisposition, WindowEvent};
use crate::session::{CommitOutcome, SessionController};
use crate::strategy;

pub use surface::{TerminalEditor, TerminalList};

const PROMPT: &str = "> ";
const EDITOR_ROW: u16 = 2;

type TerminalController = SessionController<TerminalEditor, TerminalList>;

/// Whether the loop keeps going after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Restores the terminal when dropped
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode().map_err(terminal_error)?;
        stdout
            .execute(EnterAlternateScreen)
            .and_then(|out| out.execute(EnableMouseCapture))
            .map_err(terminal_error)?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.stdout.execute(DisableMouseCapture);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn terminal_error(err: io::Error) -> AutocompleteError {
    AutocompleteError::Terminal(err.to_string())
}

/// Run the interactive demo until the user quits.
///
/// # Returns
/// * `Result<String>` - Final document text
pub async fn run(config: &Config) -> Result<String> {
    let strategies = strategy::from_config(config)?;
    info!(count = strategies.len(), "starting terminal demo");

    let mut ctl = SessionController::new(
        strategies,
        TerminalEditor::new(PROMPT, EDITOR_ROW),
        TerminalList::new(config.menu.color),
    )
    .with_placement_offset(config.menu.offset_x, config.menu.offset_y);

    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    draw(&mut guard.stdout, &ctl)?;

    loop {
        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Ok(event)) => {
                        if handle_event(&mut ctl, event) == Flow::Quit {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(terminal_error(e)),
                    None => break,
                }
            }
            Some(delivery) = ctl.next_delivery() => {
                ctl.apply_delivery(delivery);
            }
        }
        draw(&mut guard.stdout, &ctl)?;
    }

    Ok(ctl.editor().buffer().text())
}

fn handle_event(ctl: &mut TerminalController, event: Event) -> Flow {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(ctl, key),
        Event::Mouse(mouse) => {
            handle_mouse(ctl, mouse);
            Flow::Continue
        }
        Event::Resize(..) => {
            ctl.handle_window_event(WindowEvent::Resize);
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

fn handle_key(ctl: &mut TerminalController, key: KeyEvent) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d')) {
        return Flow::Quit;
    }
    if key.code == KeyCode::Esc && !ctl.is_menu_active() {
        return Flow::Quit;
    }

    let committing = ctl.is_menu_active() && matches!(key.code, KeyCode::Enter | KeyCode::Tab);
    match ctl.handle_key(Key::from(key)) {
        KeyDisposition::Consumed => {
            if committing {
                // The editor reports the replacement as a document change
                ctl.document_changed();
            }
        }
        KeyDisposition::PassThrough => {
            if apply_to_editor(ctl.editor_mut(), key) {
                ctl.document_changed();
            }
        }
    }
    Flow::Continue
}

/// Apply an unconsumed key to the editor. Returns true if the document
/// changed.
fn apply_to_editor(editor: &mut TerminalEditor, key: KeyEvent) -> bool {
    let buffer = editor.buffer_mut();
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.type_char(c);
            true
        }
        KeyCode::Backspace => {
            let before = buffer.revision();
            buffer.backspace();
            buffer.revision() != before
        }
        KeyCode::Left => {
            buffer.move_left();
            false
        }
        KeyCode::Right => {
            buffer.move_right();
            false
        }
        KeyCode::Home => {
            buffer.set_cursor(0);
            false
        }
        KeyCode::End => {
            let end = buffer.len();
            buffer.set_cursor(end);
            false
        }
        _ => false,
    }
}

fn handle_mouse(ctl: &mut TerminalController, mouse: MouseEvent) {
    if let Some(row) = ctl.list().row_at(mouse.column, mouse.row) {
        match mouse.kind {
            MouseEventKind::Down(_) => {
                if let CommitOutcome::Committed { text, .. } = ctl.commit_row(row) {
                    debug!(text = %text, "row picked with pointer");
                    ctl.document_changed();
                }
            }
            MouseEventKind::Moved => ctl.hover_row(row),
            _ => {}
        }
        return;
    }

    if let Some(event) = WindowEvent::from_mouse(&mouse) {
        ctl.handle_window_event(event);
    }
}

fn draw(out: &mut Stdout, ctl: &TerminalController) -> Result<()> {
    render(out, ctl).map_err(terminal_error)
}

fn render<W: Write>(out: &mut W, ctl: &TerminalController) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    out.queue(Print(
        "Type @ or # to complete. Arrows move, Enter/Tab pick, Esc quits.",
    ))?;

    let editor = ctl.editor();
    editor.draw(out)?;
    ctl.list().draw(out)?;

    out.queue(MoveTo(editor.cursor_column(), editor.row()))?;
    out.flush()
}
