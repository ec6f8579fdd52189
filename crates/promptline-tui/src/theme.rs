//! Terminal styles for highlight tags and widget chrome.
//!
//! The tag table is built once on first use and shared read-only.

use std::collections::HashMap;
use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

static TOKEN_STYLES: OnceLock<HashMap<&'static str, Style>> = OnceLock::new();

fn token_styles() -> &'static HashMap<&'static str, Style> {
    TOKEN_STYLES.get_or_init(|| {
        HashMap::from([
            ("keyword", Style::default().fg(Color::Magenta)),
            ("string", Style::default().fg(Color::Green)),
            ("number", Style::default().fg(Color::Yellow)),
            ("comment", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
            ("operator", Style::default().fg(Color::Cyan)),
            ("bracket", Style::default().fg(Color::Blue)),
            ("ident", Style::default()),
            ("error", Style::default().fg(Color::Red)),
        ])
    })
}

/// Style for a highlighter tag. Unknown tags render unstyled.
pub fn token_style(tag: &str) -> Style {
    token_styles().get(tag).copied().unwrap_or_default()
}

pub fn prompt_marker() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn input_marker() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn output_text() -> Style {
    Style::default()
}

pub fn header_text() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

pub fn error_title() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn link() -> Style {
    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
}

pub fn share_marker() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn diagnostic() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::UNDERLINED)
}

pub fn selection() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub fn border() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn status_hint() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn status_error() -> Style {
    Style::default().fg(Color::Red)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_and_plain_tags_are_unstyled() {
        assert_eq!(token_style("none"), Style::default());
        assert_eq!(token_style("no-such-tag"), Style::default());
        assert_eq!(token_style("string").fg, Some(Color::Green));
    }
}
