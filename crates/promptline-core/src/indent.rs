//! Smart indentation.
//!
//! Every command here is a pure function from an [`Edit`] snapshot (buffer
//! text plus selection) to the resulting snapshot. Offsets are character
//! positions; only the space character counts as indentation.

use crate::text::{leading_spaces, line_end, line_start};

/// Buffer text and selection bounds, before or after an indentation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl Edit {
    /// Creates a snapshot, clamping and ordering the selection bounds.
    pub fn new(text: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let a = selection_start.min(len);
        let b = selection_end.min(len);
        Self {
            text,
            selection_start: a.min(b),
            selection_end: a.max(b),
        }
    }

    /// Creates a snapshot with a collapsed selection at `pos`.
    pub fn cursor(text: impl Into<String>, pos: usize) -> Self {
        Self::new(text, pos, pos)
    }

    pub fn has_selection(&self) -> bool {
        self.selection_start != self.selection_end
    }

    fn chars(&self) -> Vec<char> {
        self.text.chars().collect()
    }
}

fn bracket_depth(line: &[char]) -> isize {
    line.iter()
        .map(|c| match c {
            '(' | '{' | '[' => 1,
            ')' | '}' | ']' => -1,
            _ => 0,
        })
        .sum()
}

fn splice(chars: &[char], start: usize, end: usize, insert: &str) -> String {
    chars[..start]
        .iter()
        .copied()
        .chain(insert.chars())
        .chain(chars[end..].iter().copied())
        .collect()
}

/// Starts of every line whose start lies in `[line_start(from), to]`.
fn touched_line_starts(chars: &[char], from: usize, to: usize) -> Vec<usize> {
    let first = line_start(chars, from);
    let to = to.min(chars.len());
    let mut starts = vec![first];
    starts.extend(
        (first..to)
            .filter(|&i| chars[i] == '\n')
            .map(|i| i + 1),
    );
    starts
}

/// Inserts a newline, carrying over the current indentation and adding one
/// unit when the line so far opens more brackets than it closes.
pub fn smart_newline(edit: &Edit, indent: usize) -> Edit {
    let chars = edit.chars();
    let at = edit.selection_start;
    let start = line_start(&chars, at);
    let line = &chars[start..at];

    let mut width = line.iter().take_while(|&&c| c == ' ').count();
    if bracket_depth(line) > 0 {
        width += indent;
    }

    let insert = format!("\n{}", " ".repeat(width));
    let text = splice(&chars, at, edit.selection_end, &insert);
    Edit::cursor(text, at + 1 + width)
}

/// Backspace that removes up to one indent unit of spaces at once.
///
/// A selection is deleted verbatim. Next to a non-space only one character
/// goes away.
pub fn smart_backspace(edit: &Edit, indent: usize) -> Edit {
    let chars = edit.chars();
    let at = edit.selection_start;

    if edit.has_selection() {
        return Edit::cursor(splice(&chars, at, edit.selection_end, ""), at);
    }
    if at == 0 {
        return edit.clone();
    }

    let mut run = 0;
    while run < indent && run < at && chars[at - run - 1] == ' ' {
        run += 1;
    }
    let n = run.max(1);

    Edit::cursor(splice(&chars, at - n, at, ""), at - n)
}

/// Moves the cursor to the first non-space character of the current line.
pub fn smart_home(edit: &Edit) -> Edit {
    let chars = edit.chars();
    let start = line_start(&chars, edit.selection_start);
    let end = line_end(&chars, start);
    let target = (start..end).find(|&i| chars[i] != ' ').unwrap_or(end);
    Edit::cursor(edit.text.clone(), target)
}

/// Inserts one indent unit of spaces at the cursor.
pub fn indent(edit: &Edit, indent: usize) -> Edit {
    let chars = edit.chars();
    let at = edit.selection_start;
    let text = splice(&chars, at, at, &" ".repeat(indent));
    Edit::new(text, at + indent, edit.selection_end + indent)
}

/// Removes up to one indent unit of leading spaces from the current line.
pub fn dedent(edit: &Edit, indent: usize) -> Edit {
    let chars = edit.chars();
    let at = edit.selection_start;
    let start = line_start(&chars, at);
    let removed = leading_spaces(&chars, start).min(indent);
    if removed == 0 {
        return edit.clone();
    }

    let text = splice(&chars, start, start + removed, "");
    Edit::cursor(text, at.saturating_sub(removed).max(start))
}

/// Indents every line touched by the selection.
pub fn block_indent(edit: &Edit, indent: usize) -> Edit {
    let chars = edit.chars();
    let starts = touched_line_starts(&chars, edit.selection_start, edit.selection_end);
    let pad = " ".repeat(indent);

    let mut text = String::with_capacity(edit.text.len() + pad.len() * starts.len());
    let mut next = starts.iter().peekable();
    for (i, &c) in chars.iter().enumerate() {
        if next.next_if(|&&s| s == i).is_some() {
            text.push_str(&pad);
        }
        text.push(c);
    }
    if next.next_if(|&&s| s == chars.len()).is_some() {
        text.push_str(&pad);
    }

    Edit::new(
        text,
        edit.selection_start + indent,
        edit.selection_end + indent * starts.len(),
    )
}

/// Dedents every line touched by the selection.
///
/// Each line loses up to one indent unit; lines with fewer leading spaces
/// lose only what they have.
pub fn block_dedent(edit: &Edit, indent: usize) -> Edit {
    let chars = edit.chars();
    let starts = touched_line_starts(&chars, edit.selection_start, edit.selection_end);
    let first = starts[0];

    let removals: Vec<(usize, usize)> = starts
        .iter()
        .map(|&s| (s, leading_spaces(&chars, s).min(indent)))
        .collect();
    let total: usize = removals.iter().map(|&(_, n)| n).sum();
    let first_removed = removals[0].1;

    let text: String = chars
        .iter()
        .enumerate()
        .filter(|&(i, _)| !removals.iter().any(|&(s, n)| i >= s && i < s + n))
        .map(|(_, &c)| c)
        .collect();

    let start = edit
        .selection_start
        .saturating_sub(first_removed)
        .max(first);
    let end = edit.selection_end.saturating_sub(total).max(start);
    Edit::new(text, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leading(line: &str) -> usize {
        line.chars().take_while(|&c| c == ' ').count()
    }

    #[test]
    fn test_newline_after_open_brackets_adds_one_unit() {
        let edit = Edit::cursor("if (x) {", 8);
        let out = smart_newline(&edit, 2);
        assert_eq!(out.text, "if (x) {\n  ");
        assert_eq!(out.selection_start, 11);
        assert_eq!(out.selection_end, 11);
    }

    #[test]
    fn test_newline_preserves_indentation_when_balanced() {
        let edit = Edit::cursor("    f(x)", 8);
        let out = smart_newline(&edit, 2);
        assert_eq!(out.text, "    f(x)\n    ");

        let edit = Edit::cursor("    }", 5);
        let out = smart_newline(&edit, 2);
        let last = out.text.rsplit('\n').next().unwrap();
        assert_eq!(leading(last), 4);
    }

    #[test]
    fn test_newline_counts_square_brackets_as_openers() {
        let edit = Edit::cursor("x <- c[", 7);
        let out = smart_newline(&edit, 4);
        assert!(out.text.ends_with("\n    "));
    }

    #[test]
    fn test_newline_only_looks_at_text_before_cursor() {
        // cursor sits before the closing paren, so the line prefix is open
        let edit = Edit::cursor("f()", 2);
        let out = smart_newline(&edit, 2);
        assert_eq!(out.text, "f(\n  )");
        assert_eq!(out.selection_start, 5);
    }

    #[test]
    fn test_newline_replaces_selection() {
        let edit = Edit::new("abcdef", 2, 4);
        let out = smart_newline(&edit, 2);
        assert_eq!(out.text, "ab\nef");
        assert_eq!(out.selection_start, 3);
    }

    #[test]
    fn test_backspace_removes_one_indent_unit_of_spaces() {
        let edit = Edit::cursor("    x", 4);
        let out = smart_backspace(&edit, 2);
        assert_eq!(out.text, "  x");
        assert_eq!(out.selection_start, 2);
    }

    #[test]
    fn test_backspace_removes_short_space_run() {
        let edit = Edit::cursor("ab x", 3);
        let out = smart_backspace(&edit, 4);
        assert_eq!(out.text, "abx");
        assert_eq!(out.selection_start, 2);
    }

    #[test]
    fn test_backspace_next_to_content_removes_one_char() {
        let edit = Edit::cursor("abc", 3);
        let out = smart_backspace(&edit, 2);
        assert_eq!(out.text, "ab");
        assert_eq!(out.selection_start, 2);
    }

    #[test]
    fn test_backspace_joins_lines_at_line_start() {
        let edit = Edit::cursor("a\nb", 2);
        let out = smart_backspace(&edit, 2);
        assert_eq!(out.text, "ab");
        assert_eq!(out.selection_start, 1);
    }

    #[test]
    fn test_backspace_counts_follow_indent_unit() {
        for k in 0..6 {
            let text = format!("x{}", " ".repeat(k));
            let edit = Edit::cursor(text.clone(), k + 1);
            let out = smart_backspace(&edit, 3);
            let removed = text.chars().count() - out.text.chars().count();
            assert_eq!(removed, k.clamp(1, 3), "k = {k}");
        }
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let edit = Edit::cursor("abc", 0);
        assert_eq!(smart_backspace(&edit, 2), edit);
    }

    #[test]
    fn test_backspace_deletes_selection_verbatim() {
        let edit = Edit::new("a    b", 1, 5);
        let out = smart_backspace(&edit, 2);
        assert_eq!(out.text, "ab");
        assert_eq!(out.selection_start, 1);
    }

    #[test]
    fn test_home_targets_first_content_character() {
        let edit = Edit::cursor("x\n    abc", 9);
        let out = smart_home(&edit);
        assert_eq!(out.selection_start, 6);
        // pressing again keeps the same target
        assert_eq!(smart_home(&out).selection_start, 6);
    }

    #[test]
    fn test_home_on_blank_line_goes_to_line_end() {
        let edit = Edit::cursor("a\n   \nb", 3);
        assert_eq!(smart_home(&edit).selection_start, 5);
    }

    #[test]
    fn test_indent_inserts_spaces_at_cursor() {
        let edit = Edit::cursor("ab", 1);
        let out = indent(&edit, 2);
        assert_eq!(out.text, "a  b");
        assert_eq!(out.selection_start, 3);
    }

    #[test]
    fn test_dedent_removes_leading_spaces_and_shifts_cursor() {
        let edit = Edit::cursor("a\n   bc", 6);
        let out = dedent(&edit, 2);
        assert_eq!(out.text, "a\n bc");
        assert_eq!(out.selection_start, 4);
    }

    #[test]
    fn test_dedent_clamps_cursor_to_line_start() {
        let edit = Edit::cursor("a\n    b", 3);
        let out = dedent(&edit, 2);
        assert_eq!(out.text, "a\n  b");
        assert_eq!(out.selection_start, 2);
    }

    #[test]
    fn test_dedent_at_line_end_uses_current_line() {
        // cursor sits right before the newline ending the first line
        let edit = Edit::cursor("  a\n  b", 3);
        let out = dedent(&edit, 2);
        assert_eq!(out.text, "a\n  b");
        assert_eq!(out.selection_start, 1);
    }

    #[test]
    fn test_block_indent_touches_selected_lines_only() {
        let text = "a\nb\nc\nd";
        // selection from the "b" line into the "c" line
        let edit = Edit::new(text, 2, 5);
        let out = block_indent(&edit, 2);
        assert_eq!(out.text, "a\n  b\n  c\nd");
        assert_eq!(out.selection_start, 4);
        assert_eq!(out.selection_end, 9);
    }

    #[test]
    fn test_block_indent_includes_line_starting_at_selection_end() {
        let edit = Edit::new("ab\ncd", 0, 3);
        let out = block_indent(&edit, 2);
        assert_eq!(out.text, "  ab\n  cd");
    }

    #[test]
    fn test_block_indent_handles_empty_last_line() {
        let edit = Edit::new("a\n", 0, 2);
        let out = block_indent(&edit, 2);
        assert_eq!(out.text, "  a\n  ");
        assert_eq!(out.selection_end, 6);
    }

    #[test]
    fn test_block_dedent_counts_per_line_removals() {
        let text = "    a\n b\n  c\nd";
        let edit = Edit::new(text, 4, 12);
        let out = block_dedent(&edit, 2);
        assert_eq!(out.text, "  a\nb\nc\nd");
        assert_eq!(out.selection_start, 2);
        assert_eq!(out.selection_end, 7);
    }

    #[test]
    fn test_block_dedent_leaves_other_lines_alone() {
        let text = "  a\n  b\n  c";
        let edit = Edit::new(text, 4, 6);
        let out = block_dedent(&edit, 2);
        assert_eq!(out.text, "  a\nb\n  c");
    }

    #[test]
    fn test_block_round_trip_restores_text() {
        let text = "fn() {\n  x\n}";
        let edit = Edit::new(text, 0, text.chars().count());
        let indented = block_indent(&edit, 2);
        let back = block_dedent(&indented, 2);
        assert_eq!(back.text, text);
    }
}
