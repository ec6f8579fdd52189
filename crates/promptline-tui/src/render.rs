//! Pure view functions.
//!
//! Everything here reads `&AppState` and draws into a ratatui frame. The only
//! writes are to the interior-mutable hit-testing maps, so mouse handling can
//! find what was drawn where.

use promptline_core::highlight::{self, HighlightToken};
use promptline_core::prompt::ISSUE_LINK_LABEL;
use promptline_core::{OutputLocation, OutputRecord, RecordContent, RecordKind, run_hint};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::selection::LineMapping;
use crate::state::{AppState, StatusKind};
use crate::theme;

/// Marker in front of the first prompt row and of recorded inputs.
pub const PROMPT_PREFIX: &str = "> ";
/// Indent in front of continuation rows.
const CONTINUATION_PREFIX: &str = "  ";
const SHARE_MARKER: &str = "[share]";
const STATUS_HEIGHT: u16 = 1;

pub fn render(state: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let prompt_height = prompt_height(state, area.height);
    let location = state.prompt.output().location();

    let constraints = match location {
        OutputLocation::Above => [
            Constraint::Min(1),
            Constraint::Length(prompt_height),
            Constraint::Length(STATUS_HEIGHT),
        ],
        OutputLocation::Below => [
            Constraint::Length(prompt_height),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ],
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    let (output_area, prompt_area) = match location {
        OutputLocation::Above => (chunks[0], chunks[1]),
        OutputLocation::Below => (chunks[1], chunks[0]),
    };

    render_output(state, frame, output_area, location);
    render_prompt(state, frame, prompt_area, location);
    render_status(state, frame, chunks[2]);
}

/// Prompt rows plus its border, capped at half the screen.
fn prompt_height(state: &AppState, total: u16) -> u16 {
    let rows = u16::try_from(state.prompt.state().row_count()).unwrap_or(u16::MAX);
    let cap = (total / 2).max(2);
    rows.saturating_add(1).min(cap)
}

// ============================================================================
// Prompt
// ============================================================================

fn render_prompt(state: &AppState, frame: &mut Frame, area: Rect, location: OutputLocation) {
    let borders = match location {
        OutputLocation::Above => Borders::TOP,
        OutputLocation::Below => Borders::BOTTOM,
    };
    let block = Block::default().borders(borders).border_style(theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    state.prompt_area.set(inner);

    let prompt_state = state.prompt.state();
    let rows = state.prompt.overlay_rows();
    let (cursor_row, cursor_col) = prompt_state.cursor_row_col();
    let height = usize::from(inner.height.max(1));
    let scroll = (cursor_row + 1).saturating_sub(height);
    state.prompt_scroll.set(scroll);

    let mut row_start = 0;
    let mut row_starts = Vec::with_capacity(rows.len());
    for row in &rows {
        row_starts.push(row_start);
        row_start += row.iter().map(|t| t.text.chars().count()).sum::<usize>() + 1;
    }

    let lines: Vec<Line<'static>> = rows
        .iter()
        .zip(row_starts)
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(idx, (tokens, start))| {
            let prefix = if idx == 0 {
                Span::styled(PROMPT_PREFIX, theme::prompt_marker())
            } else {
                Span::raw(CONTINUATION_PREFIX)
            };
            let mut spans = vec![prefix];
            spans.extend(prompt_row_spans(state, tokens, start));
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    let line = prompt_state.lines().get(cursor_row).copied().unwrap_or("");
    let before: String = line.chars().take(cursor_col).collect();
    let x = usize::from(inner.x) + PROMPT_PREFIX.width() + before.width();
    let y = usize::from(inner.y) + cursor_row - scroll;
    frame.set_cursor_position(Position::new(
        u16::try_from(x).unwrap_or(u16::MAX),
        u16::try_from(y).unwrap_or(u16::MAX),
    ));
}

/// Styles one prompt row: highlight tags, diagnostic marks, selection.
fn prompt_row_spans(state: &AppState, tokens: &[HighlightToken], row_start: usize) -> Vec<Span<'static>> {
    let prompt_state = state.prompt.state();
    let (sel_start, sel_end) = (prompt_state.selection_start(), prompt_state.selection_end());
    let diagnostics = state.prompt.diagnostics();

    let mut offset = row_start;
    let mut styled = Vec::new();
    for token in tokens {
        let base = theme::token_style(&token.style);
        for c in token.text.chars() {
            let mut style = base;
            if diagnostics.mark_at(offset).is_some() {
                style = style.patch(theme::diagnostic());
            }
            if offset >= sel_start && offset < sel_end {
                style = style.patch(theme::selection());
            }
            styled.push((c, style));
            offset += 1;
        }
    }
    group_styled(styled)
}

/// Merges runs of equally styled characters into spans.
fn group_styled(chars: impl IntoIterator<Item = (char, Style)>) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    for (c, style) in chars {
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    spans
}

// ============================================================================
// Output region
// ============================================================================

fn render_output(state: &AppState, frame: &mut Frame, area: Rect, location: OutputLocation) {
    let can_share = state.prompt.can_share();
    let all: Vec<(Line<'static>, LineMapping)> = state
        .prompt
        .output()
        .records()
        .iter()
        .flat_map(|record| record_lines(record, can_share))
        .collect();

    let height = usize::from(area.height);
    let total = all.len();
    let from_bottom = state.scroll.from_bottom.min(total.saturating_sub(height));
    let start = total.saturating_sub(height + from_bottom);
    let visible: Vec<(Line<'static>, LineMapping)> =
        all.into_iter().skip(start).take(height).collect();

    // Records hug the prompt: bottom-aligned above it, top-aligned below it.
    let padding = match location {
        OutputLocation::Above => height - visible.len(),
        OutputLocation::Below => 0,
    };
    let drawn = Rect {
        y: area.y + u16::try_from(padding).unwrap_or(0),
        height: u16::try_from(visible.len()).unwrap_or(area.height),
        ..area
    };

    let map = &state.output_map;
    map.reset(drawn);
    map.set_extent(total, height);

    let lines: Vec<Line<'static>> = visible
        .into_iter()
        .enumerate()
        .map(|(idx, (line, mapping))| {
            let len = mapping.text.chars().count();
            let line = match state.selection.line_selection(idx, len) {
                Some((from, to)) => select_columns(line, from, to),
                None => line,
            };
            map.push(mapping);
            line
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), drawn);
}

/// Lines for one record, each paired with its hit-testing mapping.
fn record_lines(record: &OutputRecord, can_share: bool) -> Vec<(Line<'static>, LineMapping)> {
    let target = (record.interactive && record.kind != RecordKind::Error).then_some(record.id);
    let mut lines = match &record.content {
        RecordContent::Highlighted(tokens) => {
            let rows = highlight::overlay_rows(&highlight::render(tokens));
            rows.into_iter()
                .enumerate()
                .map(|(idx, row)| {
                    let prefix = if idx == 0 { PROMPT_PREFIX } else { CONTINUATION_PREFIX };
                    let mut text = prefix.to_string();
                    let mut spans = vec![Span::styled(prefix, theme::input_marker())];
                    for token in row {
                        text.push_str(&token.text);
                        spans.push(Span::styled(token.text, theme::token_style(&token.style)));
                    }
                    mapped(Line::from(spans), text, target)
                })
                .collect()
        }
        RecordContent::Text(text) => {
            let style = if record.interactive {
                theme::output_text()
            } else {
                theme::header_text()
            };
            let text = text.strip_suffix('\n').unwrap_or(text.as_str());
            if text.is_empty() {
                Vec::new()
            } else {
                text.split('\n')
                    .map(|line| {
                        mapped(Line::from(Span::styled(line.to_string(), style)), line.to_string(), target)
                    })
                    .collect()
            }
        }
        RecordContent::UnexpectedError { title, issue_url } => {
            let link_line = format!("{ISSUE_LINK_LABEL} {issue_url}");
            vec![
                mapped(Line::from(Span::styled(title.clone(), theme::error_title())), title.clone(), None),
                mapped(
                    Line::from(vec![
                        Span::raw(format!("{ISSUE_LINK_LABEL} ")),
                        Span::styled(issue_url.clone(), theme::link()),
                    ]),
                    link_line,
                    None,
                ),
            ]
        }
    };

    if can_share
        && target.is_some()
        && let Some((line, mapping)) = lines.first_mut()
    {
        let start = mapping.text.chars().count() + 1;
        mapping.text.push(' ');
        mapping.text.push_str(SHARE_MARKER);
        mapping.share_cols = Some((start, start + SHARE_MARKER.chars().count()));
        line.spans.push(Span::raw(" "));
        line.spans.push(Span::styled(SHARE_MARKER, theme::share_marker()));
    }
    lines
}

fn mapped(
    line: Line<'static>,
    text: String,
    record: Option<promptline_core::RecordId>,
) -> (Line<'static>, LineMapping) {
    (
        line,
        LineMapping {
            text,
            record,
            share_cols: None,
        },
    )
}

/// Restyles columns `[from, to)` of a line as selected.
fn select_columns(line: Line<'static>, from: usize, to: usize) -> Line<'static> {
    let chars = line.spans.iter().flat_map(|span| {
        let style = span.style;
        span.content.chars().map(move |c| (c, style)).collect::<Vec<_>>()
    });
    let styled = chars.enumerate().map(|(idx, (c, style))| {
        if idx >= from && idx < to {
            (c, style.patch(theme::selection()))
        } else {
            (c, style)
        }
    });
    Line::from(group_styled(styled))
}

// ============================================================================
// Status line
// ============================================================================

fn render_status(state: &AppState, frame: &mut Frame, area: Rect) {
    let hints = format!("{} run · Ctrl+L clear · Ctrl+C quit", run_hint());
    let hint_width = u16::try_from(hints.width()).unwrap_or(u16::MAX);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(hint_width)])
        .split(area);

    let left = if let Some(status) = &state.status {
        let style = match status.kind {
            StatusKind::Info => theme::status_hint(),
            StatusKind::Error => theme::status_error(),
        };
        Line::from(Span::styled(status.text.clone(), style))
    } else if let Some(message) = diagnostic_message(state) {
        Line::from(Span::styled(message, theme::status_error()))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(left), chunks[0]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hints, theme::status_hint()))),
        chunks[1],
    );
}

/// Message of the diagnostic under the cursor, or of the first one drawn.
fn diagnostic_message(state: &AppState) -> Option<String> {
    let diagnostics = state.prompt.diagnostics();
    let cursor = state.prompt.state().cursor();
    diagnostics
        .mark_at(cursor)
        .or_else(|| diagnostics.mark_at(cursor.saturating_sub(1)))
        .or_else(|| diagnostics.marks().first())
        .map(|mark| mark.message.clone())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use promptline_core::config::OutputConfig;
    use promptline_core::{Backend, Config, Diagnostic, OutputMode, Prompt};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    struct Upper;

    impl Backend for Upper {
        fn evaluate(&mut self, code: &str, _sink: &mut dyn FnMut(&str)) -> anyhow::Result<String> {
            if code == "fail" {
                anyhow::bail!("nope");
            }
            Ok(code.to_uppercase())
        }

        fn validate(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>> {
            Ok(if code.ends_with('(') {
                vec![Diagnostic::new(code.chars().count(), code.chars().count(), "unclosed paren")]
            } else {
                Vec::new()
            })
        }
    }

    fn app(config: Config) -> AppState {
        AppState::new(Prompt::new(config, Upper))
    }

    fn draw(state: &AppState, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(state, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_records_render_above_prompt() {
        let mut state = app(Config::default());
        state.prompt.run("abc");
        let rows = draw(&state, 60, 8);
        let input = rows.iter().position(|r| r == "> abc").unwrap();
        let output = rows.iter().position(|r| r == "ABC").unwrap();
        assert!(input < output);
        // Output sits right above the prompt border.
        assert!(rows[output + 1].starts_with('─'));
        assert_eq!(rows[output + 2], ">");
    }

    #[test]
    fn test_records_render_below_prompt() {
        let config = Config {
            output: OutputConfig {
                location: OutputLocation::Below,
                mode: OutputMode::History,
            },
            ..Config::default()
        };
        let mut state = app(config);
        state.prompt.run("abc");
        let rows = draw(&state, 60, 8);
        assert_eq!(rows[0], ">");
        assert!(rows[1].starts_with('─'));
        assert_eq!(rows[2], "> abc");
        assert_eq!(rows[3], "ABC");
    }

    #[test]
    fn test_error_record_shows_issue_link_not_error() {
        let mut state = app(Config::default());
        state.prompt.run("fail");
        let rows = draw(&state, 80, 8).join("\n");
        assert!(rows.contains("Error: An unexpected error was encountered!"));
        assert!(rows.contains(ISSUE_LINK_LABEL));
        assert!(!rows.contains("nope"));
    }

    #[test]
    fn test_share_marker_is_mapped() {
        let config = Config {
            share_base_url: Some("https://example.org/".to_string()),
            ..Config::default()
        };
        let mut state = app(config);
        state.prompt.run("abc");
        let rows = draw(&state, 60, 8);
        assert!(rows.iter().any(|r| r == "> abc [share]"));
        let first = state.output_map.get(0).unwrap();
        assert_eq!(first.share_cols, Some((6, 13)));
        assert!(first.is_share_hit(6));
        assert!(!first.is_share_hit(5));
    }

    #[test]
    fn test_multiline_prompt_grows() {
        let mut state = app(Config::default());
        state.prompt.set("a\nb\nc");
        let rows = draw(&state, 40, 12);
        let first = rows.iter().position(|r| r == "> a").unwrap();
        assert_eq!(rows[first + 1], "  b");
        assert_eq!(rows[first + 2], "  c");
    }

    #[test]
    fn test_diagnostic_message_in_status_after_delay() {
        let config = Config {
            diagnostics_delay_ms: 0,
            ..Config::default()
        };
        let mut state = app(config);
        state.prompt.set("f(");
        state.prompt.tick(Instant::now() + Duration::from_millis(1));
        let rows = draw(&state, 80, 6);
        assert!(rows.last().unwrap().starts_with("unclosed paren"));
    }

    #[test]
    fn test_status_line_shows_run_hint() {
        let state = app(Config::default());
        let rows = draw(&state, 80, 6);
        assert!(rows.last().unwrap().contains(run_hint()));
    }

    #[test]
    fn test_header_renders_first() {
        let config = Config {
            initial_header: Some("Welcome".to_string()),
            ..Config::default()
        };
        let state = app(config);
        let rows = draw(&state, 40, 6);
        assert!(rows.iter().any(|r| r == "Welcome"));
        assert_eq!(state.output_map.get(0).unwrap().record, None);
    }

    #[test]
    fn test_group_styled_merges_runs() {
        let red = theme::status_error();
        let spans = group_styled([('a', red), ('b', red), ('c', Style::default())]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].content, "ab");
        assert_eq!(spans[1].content, "c");
    }
}
