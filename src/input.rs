//! Host-neutral input events
//!
//! The controller reacts to a handful of keys and window events. Hosts
//! translate their own events into these types; conversions from `crossterm`
//! events are provided for terminal hosts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

/// A key press as seen by the dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Tab,
    Escape,
    Shift,
    Backspace,
    Char(char),
    /// Any key the dropdown has no name for
    Other,
}

/// Navigation direction within the candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Window-level events the controller listens to while a menu is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Pointer pressed somewhere other than a candidate row
    PointerDownOutside,
    /// Scroll wheel over the editor
    ScrollWheel,
    /// Viewport resized
    Resize,
}

/// What the host should do with a key after the controller saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The controller acted on the key; suppress its default action.
    Consumed,
    /// The controller did not consume the key; apply it to the editor.
    PassThrough,
}

impl Key {
    /// Parse a key name as used by the `replay` command.
    ///
    /// Recognized names: `up`, `down`, `enter`, `tab`, `esc`, `shift`,
    /// `backspace`, `space`; any single character is a character key.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "up" => Key::ArrowUp,
            "down" => Key::ArrowDown,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "esc" | "escape" => Key::Escape,
            "shift" => Key::Shift,
            "backspace" => Key::Backspace,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        match event.code {
            KeyCode::Up => Key::ArrowUp,
            KeyCode::Down => Key::ArrowDown,
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab | KeyCode::BackTab => Key::Tab,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Modifier(_) => Key::Shift,
            KeyCode::Char(c) if !event.modifiers.contains(KeyModifiers::CONTROL) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

impl WindowEvent {
    /// Map a mouse event to a window event, if it is one the controller
    /// cares about. Pointer presses on a row are the host's business.
    pub fn from_mouse(event: &MouseEvent) -> Option<Self> {
        match event.kind {
            MouseEventKind::Down(_) => Some(WindowEvent::PointerDownOutside),
            MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => Some(WindowEvent::ScrollWheel),
            _ => None,
        }
    }
}
