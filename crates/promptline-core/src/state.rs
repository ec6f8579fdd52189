//! Prompt buffer state.
//!
//! Holds the live text, the selection and the row count. Besides the
//! primitives the widget uses (`set`, `clear`, `set_cursor`), it implements
//! the plain text-field editing that keys without smart behavior fall
//! through to.

use crate::indent::Edit;
use crate::text::{char_len, char_to_byte_index, line_end, line_start};

/// Live buffer and selection of one prompt.
///
/// The selection is stored as an anchor and a moving head so it can be
/// extended in either direction; `selection_start <= selection_end` always
/// holds for the ordered view.
#[derive(Debug, Clone)]
pub struct PromptState {
    text: String,
    anchor: usize,
    head: usize,
    row_count: usize,
}

impl Default for PromptState {
    fn default() -> Self {
        Self {
            text: String::new(),
            anchor: 0,
            head: 0,
            row_count: 1,
        }
    }
}

impl PromptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Buffer length in characters.
    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn selection_start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn selection_end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Position of the moving end of the selection.
    pub fn cursor(&self) -> usize {
        self.head
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_at_start(&self) -> bool {
        self.selection_start() == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.selection_end() >= self.len()
    }

    /// Cursor position as (row, column) in characters.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let chars: Vec<char> = self.text.chars().collect();
        let head = self.head.min(chars.len());
        let row = chars[..head].iter().filter(|&&c| c == '\n').count();
        (row, head - line_start(&chars, head))
    }

    /// Replaces the buffer and puts the cursor at its end.
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.recalculate_rows();
        let len = self.len();
        self.anchor = len;
        self.head = len;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Collapses the selection at `pos`, clamped into the buffer.
    pub fn set_cursor(&mut self, pos: usize) {
        let pos = pos.min(self.len());
        self.anchor = pos;
        self.head = pos;
    }

    /// Sets an ordered selection, clamped into the buffer.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.len();
        self.anchor = start.min(len);
        self.head = end.min(len);
    }

    pub fn select_all(&mut self) {
        self.set_selection(0, self.len());
    }

    /// Snapshot for the indent engine.
    pub fn snapshot(&self) -> Edit {
        Edit::new(self.text.clone(), self.selection_start(), self.selection_end())
    }

    /// Applies the result of an indent command.
    pub fn apply(&mut self, edit: Edit) {
        self.text = edit.text;
        self.recalculate_rows();
        self.set_selection(edit.selection_start, edit.selection_end);
    }

    /// Inserts text at the cursor, replacing any selection.
    pub fn insert_str(&mut self, text: &str) {
        let start = self.selection_start();
        self.replace_range(start, self.selection_end(), text);
        self.set_cursor(start + char_len(text));
    }

    /// Backspace without smart behavior.
    pub fn delete_backward(&mut self) {
        if self.has_selection() {
            self.delete_selection();
        } else if self.head > 0 {
            let at = self.head;
            self.replace_range(at - 1, at, "");
            self.set_cursor(at - 1);
        }
    }

    /// Delete key: removes the selection or the character after the cursor.
    pub fn delete_forward(&mut self) {
        if self.has_selection() {
            self.delete_selection();
        } else if self.head < self.len() {
            let at = self.head;
            self.replace_range(at, at + 1, "");
            self.set_cursor(at);
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        let target = if !extend && self.has_selection() {
            self.selection_start()
        } else {
            self.head.saturating_sub(1)
        };
        self.move_head(target, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        let target = if !extend && self.has_selection() {
            self.selection_end()
        } else {
            (self.head + 1).min(self.len())
        };
        self.move_head(target, extend);
    }

    /// Moves to the same column on the previous row, or to the buffer start.
    pub fn move_up(&mut self, extend: bool) {
        let chars: Vec<char> = self.text.chars().collect();
        let start = line_start(&chars, self.head);
        let target = if start == 0 {
            0
        } else {
            let col = self.head - start;
            let prev_start = line_start(&chars, start - 1);
            (prev_start + col).min(start - 1)
        };
        self.move_head(target, extend);
    }

    /// Moves to the same column on the next row, or to the buffer end.
    pub fn move_down(&mut self, extend: bool) {
        let chars: Vec<char> = self.text.chars().collect();
        let start = line_start(&chars, self.head);
        let end = line_end(&chars, start);
        let target = if end >= chars.len() {
            chars.len()
        } else {
            let col = self.head - start;
            let next_start = end + 1;
            (next_start + col).min(line_end(&chars, next_start))
        };
        self.move_head(target, extend);
    }

    /// Moves to the end of the current row.
    pub fn move_line_end(&mut self, extend: bool) {
        let chars: Vec<char> = self.text.chars().collect();
        let target = line_end(&chars, line_start(&chars, self.head));
        self.move_head(target, extend);
    }

    /// The buffer split into rows (always at least one).
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    fn move_head(&mut self, target: usize, extend: bool) {
        self.head = target.min(self.len());
        if !extend {
            self.anchor = self.head;
        }
    }

    fn delete_selection(&mut self) {
        let start = self.selection_start();
        self.replace_range(start, self.selection_end(), "");
        self.set_cursor(start);
    }

    fn replace_range(&mut self, start: usize, end: usize, insert: &str) {
        let from = char_to_byte_index(&self.text, start);
        let to = char_to_byte_index(&self.text, end);
        self.text.replace_range(from..to, insert);
        self.recalculate_rows();
    }

    fn recalculate_rows(&mut self) {
        self.row_count = self.text.matches('\n').count() + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_recomputes_rows_and_moves_cursor_to_end() {
        let mut state = PromptState::new();
        state.set("a\nb\nc");
        assert_eq!(state.row_count(), 3);
        assert_eq!(state.cursor(), 5);
        assert!(state.is_at_end());
    }

    #[test]
    fn test_clear_resets_to_single_empty_row() {
        let mut state = PromptState::new();
        state.set("x\ny");
        state.clear();
        assert_eq!(state.text(), "");
        assert_eq!(state.row_count(), 1);
        assert!(state.is_at_start() && state.is_at_end());
    }

    #[test]
    fn test_set_cursor_clamps() {
        let mut state = PromptState::new();
        state.set("abc");
        state.set_cursor(99);
        assert_eq!(state.cursor(), 3);
        state.set_cursor(1);
        assert_eq!((state.selection_start(), state.selection_end()), (1, 1));
    }

    #[test]
    fn test_selection_is_ordered_regardless_of_direction() {
        let mut state = PromptState::new();
        state.set("hello");
        state.move_left(true);
        state.move_left(true);
        assert_eq!((state.selection_start(), state.selection_end()), (3, 5));
        assert_eq!(state.cursor(), 3);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut state = PromptState::new();
        state.set("hello world");
        state.set_selection(6, 11);
        state.insert_str("there\nfriend");
        assert_eq!(state.text(), "hello there\nfriend");
        assert_eq!(state.row_count(), 2);
        assert_eq!(state.cursor(), 18);
    }

    #[test]
    fn test_delete_backward_and_forward() {
        let mut state = PromptState::new();
        state.set("abc");
        state.set_cursor(1);
        state.delete_forward();
        assert_eq!(state.text(), "ac");
        state.delete_backward();
        assert_eq!(state.text(), "c");
        assert_eq!(state.cursor(), 0);
        state.delete_backward();
        assert_eq!(state.text(), "c");
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut state = PromptState::new();
        state.set("abcd\nx\nwxyz");
        state.set_cursor(3);
        state.move_down(false);
        assert_eq!(state.cursor(), 6);
        state.move_down(false);
        assert_eq!(state.cursor(), 8);
        state.move_up(false);
        state.move_up(false);
        assert_eq!(state.cursor(), 1);
        state.move_up(false);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_cursor_row_col_counts_chars() {
        let mut state = PromptState::new();
        state.set("é\nab");
        state.set_cursor(3);
        assert_eq!(state.cursor_row_col(), (1, 1));
    }

    #[test]
    fn test_apply_edit_updates_rows_and_selection() {
        let mut state = PromptState::new();
        state.apply(Edit::new("a\n  b", 2, 5));
        assert_eq!(state.row_count(), 2);
        assert_eq!((state.selection_start(), state.selection_end()), (2, 5));
    }
}
