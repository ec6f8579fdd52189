//! Character-offset helpers shared by the buffer and the indent engine.
//!
//! All public offsets in this crate count Unicode scalar values, never bytes.

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn char_to_byte_index(text: &str, col: usize) -> usize {
    if col == 0 {
        return 0;
    }
    text.char_indices()
        .nth(col)
        .map_or(text.len(), |(i, _)| i)
}

/// Offset of the first character of the line containing `pos`.
pub(crate) fn line_start(chars: &[char], pos: usize) -> usize {
    let pos = pos.min(chars.len());
    chars[..pos]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |nl| nl + 1)
}

/// Offset of the newline ending the line that starts at `start` (or buffer end).
pub(crate) fn line_end(chars: &[char], start: usize) -> usize {
    let start = start.min(chars.len());
    chars[start..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |offset| start + offset)
}

/// Number of consecutive spaces starting at `start`, stopping at any other character.
pub(crate) fn leading_spaces(chars: &[char], start: usize) -> usize {
    chars
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|&&c| c == ' ').count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_line_bounds_on_multiline_text() {
        let text = chars("ab\n  cd\nef");
        assert_eq!(line_start(&text, 0), 0);
        assert_eq!(line_start(&text, 3), 3);
        assert_eq!(line_start(&text, 6), 3);
        assert_eq!(line_end(&text, 3), 7);
        assert_eq!(line_end(&text, 8), 10);
        assert_eq!(leading_spaces(&text, 3), 2);
    }

    #[test]
    fn test_byte_index_handles_multibyte_chars() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 99), 6);
        assert_eq!(char_len("héllo"), 5);
    }
}
