//! Terminal implementations of the editor surface and list container

use std::io::Write;

use crossterm::QueueableCommand;
use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use nu_ansi_term::{Color, Style};

use crate::strategy::CandidateRow;
use crate::surface::{EditorSurface, ListContainer, MemoryEditor, MenuPlacement, Rect};

/// One-line editor drawn at a fixed terminal row after a prompt
#[derive(Debug, Clone)]
pub struct TerminalEditor {
    buffer: MemoryEditor,
    prompt: String,
    row: u16,
}

impl TerminalEditor {
    pub fn new(prompt: impl Into<String>, row: u16) -> Self {
        let prompt = prompt.into();
        let origin = prompt.chars().count() as i32;
        Self {
            buffer: MemoryEditor::new("").with_origin(origin),
            prompt,
            row,
        }
    }

    pub fn buffer(&self) -> &MemoryEditor {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut MemoryEditor {
        &mut self.buffer
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    /// Terminal column of the cursor
    pub fn cursor_column(&self) -> u16 {
        (self.prompt.chars().count() + self.buffer.cursor_position()) as u16
    }

    pub fn draw<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.queue(MoveTo(0, self.row))?;
        out.queue(Print(format!("{}{}", self.prompt, self.buffer.text())))?;
        Ok(())
    }
}

impl EditorSurface for TerminalEditor {
    fn document_text(&self) -> String {
        self.buffer.document_text()
    }

    fn cursor_position(&self) -> usize {
        self.buffer.cursor_position()
    }

    fn screen_rect_at(&self, offset: usize) -> Option<Rect> {
        self.buffer.screen_rect_at(offset).map(|rect| Rect {
            top: rect.top + i32::from(self.row),
            ..rect
        })
    }

    fn set_selected_range(&mut self, start: usize, end: usize) {
        self.buffer.set_selected_range(start, end);
    }

    fn delete_selected_forward(&mut self) {
        self.buffer.delete_selected_forward();
    }

    fn insert_text(&mut self, position: usize, text: &str) {
        self.buffer.insert_text(position, text);
    }

    fn focus(&mut self) {
        self.buffer.focus();
    }
}

/// Dropdown drawn as plain lines below the editor row
#[derive(Debug, Clone, Default)]
pub struct TerminalList {
    rows: Vec<String>,
    visible: bool,
    focused: usize,
    placement: Option<MenuPlacement>,
    color: bool,
}

impl TerminalList {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0)
            + 2
    }

    /// Row under the terminal cell `(column, row)`, if any
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let placement = self.placement.filter(|_| self.visible)?;
        let column = i32::from(column) - placement.left;
        let index = i32::from(row) - placement.top;
        if column < 0 || column >= self.width() as i32 || index < 0 {
            return None;
        }
        let index = index as usize;
        (index < self.rows.len()).then_some(index)
    }

    pub fn draw<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let Some(placement) = self.placement.filter(|_| self.visible) else {
            return Ok(());
        };
        let width = self.width();
        for (index, text) in self.rows.iter().enumerate() {
            let top = placement.top + index as i32;
            if top < 0 || placement.left < 0 {
                continue;
            }
            let line = format!(" {text:<width$}", width = width - 1);
            let styled = match (self.color, index == self.focused) {
                (true, true) => Style::new().on(Color::Blue).fg(Color::White).paint(line),
                (true, false) => Style::new().on(Color::DarkGray).paint(line),
                (false, true) => Style::new().reverse().paint(line),
                (false, false) => Style::new().paint(line),
            };
            out.queue(MoveTo(placement.left as u16, top as u16))?;
            out.queue(Print(styled.to_string()))?;
        }
        Ok(())
    }
}

impl ListContainer for TerminalList {
    fn hide(&mut self) {
        self.visible = false;
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.focused = 0;
    }

    fn append_row(&mut self, markup: &str, index: usize) {
        self.rows
            .push(CandidateRow::new(index, markup).visible_text());
    }

    fn focus_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.focused = index;
        }
    }

    fn position_at(&mut self, placement: MenuPlacement) {
        self.placement = Some(placement);
    }

    fn is_rendered(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_rect_includes_prompt_and_row() {
        let mut editor = TerminalEditor::new("> ", 3);
        editor.insert_text(0, "@al");
        assert_eq!(editor.screen_rect_at(2), Some(Rect::new(3, 4, 1, 1)));
        assert_eq!(editor.cursor_column(), 5);
    }

    #[test]
    fn test_list_hit_testing() {
        let mut list = TerminalList::new(false);
        list.append_row("<b>alice</b>", 0);
        list.append_row("bob", 1);
        list.position_at(MenuPlacement { top: 4, left: 5 });
        assert_eq!(list.row_at(6, 4), None);

        list.show();
        assert_eq!(list.row_at(6, 4), Some(0));
        assert_eq!(list.row_at(5, 5), Some(1));
        assert_eq!(list.row_at(5, 6), None);
        assert_eq!(list.row_at(4, 4), None);
        assert_eq!(list.row_at(12, 4), None);
    }

    #[test]
    fn test_list_draws_visible_text() {
        let mut list = TerminalList::new(false);
        list.append_row("<span>alice</span>", 0);
        list.position_at(MenuPlacement { top: 1, left: 0 });
        list.show();

        let mut out = Vec::new();
        list.draw(&mut out).unwrap();
        let drawn = String::from_utf8_lossy(&out);
        assert!(drawn.contains("alice"));
        assert!(!drawn.contains("span"));
    }
}
