//! Mouse selection over the output region.
//!
//! The renderer records what each visible output line shows in a
//! [`PositionMap`]; mouse handling maps screen cells back to records and
//! text through it. Columns are character indices within a line.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::time::{Duration, Instant};

use promptline_core::RecordId;
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

/// How long a copied selection stays highlighted.
const SELECTION_CLEAR_DELAY: Duration = Duration::from_millis(300);

/// A position among the visible output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualPosition {
    pub line: usize,
    pub column: usize,
}

impl VisualPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for VisualPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

impl PartialOrd for VisualPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What one visible output line shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMapping {
    pub text: String,
    /// Record the line belongs to, if it is clickable.
    pub record: Option<RecordId>,
    /// Column range of the share marker on this line.
    pub share_cols: Option<(usize, usize)>,
}

impl LineMapping {
    pub fn is_share_hit(&self, column: usize) -> bool {
        self.share_cols
            .is_some_and(|(start, end)| column >= start && column < end)
    }
}

/// Visible output lines and the screen area they were drawn into.
///
/// Rebuilt on every render through interior mutability so rendering can stay
/// `&self`.
#[derive(Debug, Default)]
pub struct PositionMap {
    lines: RefCell<Vec<LineMapping>>,
    area: Cell<Rect>,
    total_lines: Cell<usize>,
    visible_height: Cell<usize>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new frame drawn into `area`.
    pub fn reset(&self, area: Rect) {
        self.lines.borrow_mut().clear();
        self.area.set(area);
    }

    /// Records the size of the whole region for scroll clamping.
    pub fn set_extent(&self, total_lines: usize, visible_height: usize) {
        self.total_lines.set(total_lines);
        self.visible_height.set(visible_height);
    }

    /// Largest useful scroll distance from the bottom.
    pub fn max_scroll(&self) -> usize {
        self.total_lines
            .get()
            .saturating_sub(self.visible_height.get())
    }

    pub fn push(&self, mapping: LineMapping) {
        self.lines.borrow_mut().push(mapping);
    }

    pub fn get(&self, line: usize) -> Option<LineMapping> {
        self.lines.borrow().get(line).cloned()
    }

    /// Maps a screen cell to a position, if it lies on a drawn line.
    pub fn hit(&self, x: u16, y: u16) -> Option<VisualPosition> {
        let area = self.area.get();
        if x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
            return None;
        }
        let line = usize::from(y - area.y);
        let lines = self.lines.borrow();
        let mapping = lines.get(line)?;
        let column = column_at_width(&mapping.text, usize::from(x - area.x));
        Some(VisualPosition::new(line, column))
    }

    /// Text between two positions, lines joined with `\n`.
    pub fn get_text_range(&self, start: VisualPosition, end: VisualPosition) -> String {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let lines = self.lines.borrow();
        let last = end.line.min(lines.len().saturating_sub(1));

        let mut result = String::new();
        for (idx, mapping) in lines.iter().enumerate().take(last + 1).skip(start.line) {
            let chars: Vec<char> = mapping.text.chars().collect();
            let from = if idx == start.line { start.column.min(chars.len()) } else { 0 };
            let to = if idx == end.line { end.column.min(chars.len()) } else { chars.len() };
            result.extend(&chars[from..to.max(from)]);
            if idx < last {
                result.push('\n');
            }
        }
        result
    }
}

/// Character index reached after `width` terminal cells.
fn column_at_width(text: &str, width: usize) -> usize {
    let mut used = 0;
    for (idx, c) in text.chars().enumerate() {
        used += c.width().unwrap_or(0);
        if used > width {
            return idx;
        }
    }
    text.chars().count()
}

/// Current mouse selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    anchor: Option<VisualPosition>,
    cursor: Option<VisualPosition>,
    /// Mouse button held.
    pub is_selecting: bool,
    clear_at: Option<Instant>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, pos: VisualPosition) {
        self.anchor = Some(pos);
        self.cursor = Some(pos);
        self.is_selecting = true;
        self.clear_at = None;
    }

    pub fn extend(&mut self, pos: VisualPosition) {
        if self.anchor.is_some() {
            self.cursor = Some(pos);
        }
    }

    pub fn finish(&mut self) {
        self.is_selecting = false;
    }

    /// Keeps a copied selection visible briefly before clearing it.
    pub fn schedule_clear(&mut self) {
        self.clear_at = Some(Instant::now() + SELECTION_CLEAR_DELAY);
    }

    pub fn has_pending_clear(&self) -> bool {
        self.clear_at.is_some()
    }

    /// Clears the selection once its scheduled time has passed.
    pub fn check_and_clear(&mut self, now: Instant) -> bool {
        if let Some(clear_at) = self.clear_at
            && now >= clear_at
        {
            self.clear();
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when the selection covers at least one character.
    pub fn is_non_empty(&self) -> bool {
        self.get_range().is_some_and(|(start, end)| start != end)
    }

    pub fn get_range(&self) -> Option<(VisualPosition, VisualPosition)> {
        let anchor = self.anchor?;
        let cursor = self.cursor?;
        Some(if anchor <= cursor { (anchor, cursor) } else { (cursor, anchor) })
    }

    /// Selected column range within `line`, if any.
    pub fn line_selection(&self, line: usize, line_len: usize) -> Option<(usize, usize)> {
        let (start, end) = self.get_range()?;
        if line < start.line || line > end.line {
            return None;
        }
        let from = if line == start.line { start.column } else { 0 };
        let to = if line == end.line { end.column } else { line_len };
        let (from, to) = (from.min(line_len), to.min(line_len));
        (from < to).then_some((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(lines: &[&str]) -> PositionMap {
        let map = PositionMap::new();
        map.reset(Rect::new(2, 1, 20, 5));
        for line in lines {
            map.push(LineMapping {
                text: (*line).to_string(),
                ..LineMapping::default()
            });
        }
        map
    }

    #[test]
    fn test_visual_position_ordering() {
        assert!(VisualPosition::new(0, 5) < VisualPosition::new(0, 10));
        assert!(VisualPosition::new(0, 10) < VisualPosition::new(1, 0));
    }

    #[test]
    fn test_selection_reverse_order() {
        let mut sel = SelectionState::new();
        sel.start(VisualPosition::new(5, 10));
        sel.extend(VisualPosition::new(2, 5));
        assert_eq!(
            sel.get_range(),
            Some((VisualPosition::new(2, 5), VisualPosition::new(5, 10)))
        );
    }

    #[test]
    fn test_click_is_not_a_selection() {
        let mut sel = SelectionState::new();
        sel.start(VisualPosition::new(1, 3));
        sel.finish();
        assert!(!sel.is_non_empty());
        sel.start(VisualPosition::new(1, 3));
        sel.extend(VisualPosition::new(1, 4));
        assert!(sel.is_non_empty());
    }

    #[test]
    fn test_scheduled_clear() {
        let mut sel = SelectionState::new();
        sel.start(VisualPosition::new(0, 0));
        sel.extend(VisualPosition::new(0, 2));
        sel.schedule_clear();
        assert!(!sel.check_and_clear(Instant::now()));
        assert!(sel.check_and_clear(Instant::now() + Duration::from_secs(1)));
        assert!(!sel.is_non_empty());
    }

    #[test]
    fn test_line_selection() {
        let mut sel = SelectionState::new();
        sel.start(VisualPosition::new(1, 5));
        sel.extend(VisualPosition::new(3, 10));

        assert!(sel.line_selection(0, 20).is_none());
        assert_eq!(sel.line_selection(1, 20), Some((5, 20)));
        assert_eq!(sel.line_selection(2, 15), Some((0, 15)));
        assert_eq!(sel.line_selection(3, 20), Some((0, 10)));
        assert!(sel.line_selection(4, 20).is_none());
    }

    #[test]
    fn test_hit_maps_screen_to_line() {
        let map = map(&["hello", "wörld"]);
        assert_eq!(map.hit(3, 1), Some(VisualPosition::new(0, 1)));
        assert_eq!(map.hit(4, 2), Some(VisualPosition::new(1, 2)));
        assert_eq!(map.hit(4, 3), None);
        assert_eq!(map.hit(0, 1), None);
    }

    #[test]
    fn test_get_text_range_across_lines() {
        let map = map(&["Hello", "World!"]);
        let text = map.get_text_range(VisualPosition::new(0, 2), VisualPosition::new(1, 3));
        assert_eq!(text, "llo\nWor");
    }

    #[test]
    fn test_column_at_width_counts_wide_chars() {
        assert_eq!(column_at_width("你好A", 0), 0);
        assert_eq!(column_at_width("你好A", 1), 0);
        assert_eq!(column_at_width("你好A", 2), 1);
        assert_eq!(column_at_width("你好A", 4), 2);
        assert_eq!(column_at_width("你好A", 9), 3);
    }
}
