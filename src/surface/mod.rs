//! External collaborators of the autocomplete core
//!
//! The controller never owns document storage or rendering. It talks to two
//! collaborators through the traits in this module:
//!
//! - [`EditorSurface`]: the text-editing surface (document text, cursor,
//!   range deletion, insertion, on-screen geometry, input focus)
//! - [`ListContainer`]: the visual container the candidate rows live in
//!
//! Hosts implement both for their toolkit. [`memory`] provides in-memory
//! implementations used by tests and by the non-interactive CLI commands.

pub mod memory;

pub use memory::{ListOp, MemoryEditor, RecordingList};

/// On-screen rectangle, in host units (pixels, terminal cells, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

/// Where the menu's top-left corner should be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuPlacement {
    pub top: i32,
    pub left: i32,
}

impl MenuPlacement {
    /// Place the menu just below and to the right of `anchor`.
    pub fn below_right_of(anchor: Rect) -> Self {
        Self {
            top: anchor.top + anchor.height,
            left: anchor.left + anchor.width,
        }
    }

    /// Shift the placement by a fixed offset.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            top: self.top + dy,
            left: self.left + dx,
        }
    }
}

/// The text-editing surface the overlay is attached to.
///
/// Offsets are character offsets into [`EditorSurface::document_text`].
pub trait EditorSurface {
    /// Full document text, formatting stripped.
    fn document_text(&self) -> String;

    /// Current cursor offset.
    fn cursor_position(&self) -> usize;

    /// On-screen rectangle of the character at `offset`, if the surface can
    /// report one.
    fn screen_rect_at(&self, offset: usize) -> Option<Rect>;

    /// Select the half-open range `[start, end)`.
    fn set_selected_range(&mut self, start: usize, end: usize);

    /// Delete the current selection (or one character forward when the
    /// selection is collapsed).
    fn delete_selected_forward(&mut self);

    /// Insert `text` at `position` and leave the cursor after it.
    fn insert_text(&mut self, position: usize, text: &str);

    /// Return input focus to the editor.
    fn focus(&mut self);
}

/// The visual list container holding candidate rows.
pub trait ListContainer {
    fn hide(&mut self);

    fn show(&mut self);

    /// Remove every row.
    fn clear(&mut self);

    /// Append a rendered row at `index`.
    fn append_row(&mut self, markup: &str, index: usize);

    /// Give keyboard focus to the row at `index`.
    fn focus_row(&mut self, index: usize);

    /// Move the container to `placement`.
    fn position_at(&mut self, placement: MenuPlacement);

    /// Whether the container currently holds rendered rows it can measure.
    fn is_rendered(&self) -> bool;
}

impl<T: EditorSurface + ?Sized> EditorSurface for Box<T> {
    fn document_text(&self) -> String {
        (**self).document_text()
    }

    fn cursor_position(&self) -> usize {
        (**self).cursor_position()
    }

    fn screen_rect_at(&self, offset: usize) -> Option<Rect> {
        (**self).screen_rect_at(offset)
    }

    fn set_selected_range(&mut self, start: usize, end: usize) {
        (**self).set_selected_range(start, end)
    }

    fn delete_selected_forward(&mut self) {
        (**self).delete_selected_forward()
    }

    fn insert_text(&mut self, position: usize, text: &str) {
        (**self).insert_text(position, text)
    }

    fn focus(&mut self) {
        (**self).focus()
    }
}
