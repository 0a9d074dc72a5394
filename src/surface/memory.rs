//! In-memory collaborators
//!
//! [`MemoryEditor`] keeps the document as a `Vec<char>` so every offset is a
//! character offset. [`RecordingList`] keeps the rows it was handed and logs
//! every call, which lets tests assert on the exact sequence of container
//! operations.

use super::{EditorSurface, ListContainer, MenuPlacement, Rect};

/// Width and height of one character cell reported by [`MemoryEditor`].
const CELL_WIDTH: i32 = 1;
const CELL_HEIGHT: i32 = 1;

/// Single-line in-memory editor
#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    chars: Vec<char>,
    cursor: usize,
    selection: Option<(usize, usize)>,
    focused: bool,
    /// Column the document starts at on screen (e.g. after a prompt)
    origin: i32,
    /// Number of mutations applied, for asserting "no mutation"
    revision: u64,
}

impl MemoryEditor {
    /// Create an editor holding `text` with the cursor at its end.
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self {
            chars,
            cursor,
            ..Self::default()
        }
    }

    /// Builder-style cursor placement, clamped to the document.
    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.set_cursor(cursor);
        self
    }

    /// Builder-style screen origin for [`EditorSurface::screen_rect_at`].
    pub fn with_origin(mut self, origin: i32) -> Self {
        self.origin = origin;
        self
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.chars.len());
        self.selection = None;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Insert a character at the cursor.
    pub fn type_char(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
        self.selection = None;
        self.revision += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        self.selection = None;
        self.revision += 1;
    }

    pub fn move_left(&mut self) {
        self.set_cursor(self.cursor.saturating_sub(1));
    }

    pub fn move_right(&mut self) {
        self.set_cursor(self.cursor + 1);
    }
}

impl EditorSurface for MemoryEditor {
    fn document_text(&self) -> String {
        self.text()
    }

    fn cursor_position(&self) -> usize {
        self.cursor
    }

    fn screen_rect_at(&self, offset: usize) -> Option<Rect> {
        if offset >= self.chars.len() {
            return None;
        }
        let column = self.origin + offset as i32 * CELL_WIDTH;
        Some(Rect::new(0, column, CELL_WIDTH, CELL_HEIGHT))
    }

    fn set_selected_range(&mut self, start: usize, end: usize) {
        let len = self.chars.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.selection = Some((start, end));
        self.cursor = start;
    }

    fn delete_selected_forward(&mut self) {
        match self.selection.take() {
            Some((start, end)) if end > start => {
                self.chars.drain(start..end);
                self.cursor = start;
            }
            _ => {
                if self.cursor >= self.chars.len() {
                    return;
                }
                self.chars.remove(self.cursor);
            }
        }
        self.revision += 1;
    }

    fn insert_text(&mut self, position: usize, text: &str) {
        let position = position.min(self.chars.len());
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(position..position, inserted);
        self.cursor = position + count;
        self.selection = None;
        self.revision += 1;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

/// One recorded call on a [`RecordingList`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    Hide,
    Show,
    Clear,
    Append(usize),
    Focus(usize),
    Position(MenuPlacement),
}

/// List container that records what it is asked to do
#[derive(Debug, Clone, Default)]
pub struct RecordingList {
    rows: Vec<String>,
    visible: bool,
    focused: Option<usize>,
    placement: Option<MenuPlacement>,
    ops: Vec<ListOp>,
}

impl RecordingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn placement(&self) -> Option<MenuPlacement> {
        self.placement
    }

    pub fn ops(&self) -> &[ListOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl ListContainer for RecordingList {
    fn hide(&mut self) {
        self.visible = false;
        self.ops.push(ListOp::Hide);
    }

    fn show(&mut self) {
        self.visible = true;
        self.ops.push(ListOp::Show);
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.focused = None;
        self.ops.push(ListOp::Clear);
    }

    fn append_row(&mut self, markup: &str, index: usize) {
        // Rows arrive in order; a gap means the caller skipped one.
        debug_assert_eq!(index, self.rows.len());
        self.rows.push(markup.to_string());
        self.ops.push(ListOp::Append(index));
    }

    fn focus_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.focused = Some(index);
        }
        self.ops.push(ListOp::Focus(index));
    }

    fn position_at(&mut self, placement: MenuPlacement) {
        self.placement = Some(placement);
        self.ops.push(ListOp::Position(placement));
    }

    fn is_rendered(&self) -> bool {
        !self.rows.is_empty()
    }
}
