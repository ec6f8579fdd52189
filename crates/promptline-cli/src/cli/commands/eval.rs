//! One-shot evaluation without the terminal UI.
//!
//! Runs a single submission through the same [`Prompt`] the interactive mode
//! uses and prints every output record as plain text.

use std::io::{Write, stdout};

use anyhow::{Result, bail};
use promptline_core::prompt::ISSUE_LINK_LABEL;
use promptline_core::{highlight, share};
use promptline_core::{Backend, Config, OutputRecord, Prompt, RecordContent, RecordKind};
use tracing::info;

pub fn run(config: Config, backend: Box<dyn Backend>, code: &str, print_share: bool) -> Result<()> {
    if print_share && config.share_base_url.is_none() {
        bail!("Sharing is disabled; set share_base_url or pass --share-base-url");
    }

    let mut prompt = Prompt::new(config, backend);
    prompt.run(code);
    info!(records = prompt.output().len(), "eval finished");

    let mut out = stdout().lock();
    for record in prompt.output().records() {
        for line in record_lines(record) {
            writeln!(out, "{line}")?;
        }
    }

    if print_share && let Some(base) = prompt.config().share_base_url.as_deref() {
        writeln!(out, "Share: {}", share::share_url(base, code)?)?;
    }
    out.flush()?;

    if prompt
        .output()
        .records()
        .iter()
        .any(|r| r.kind == RecordKind::Error)
    {
        bail!("Evaluation failed (details in the log file)");
    }
    Ok(())
}

/// Plain-text lines for one record, mirroring the terminal layout.
fn record_lines(record: &OutputRecord) -> Vec<String> {
    match &record.content {
        RecordContent::Highlighted(tokens) => {
            let text = highlight::source_text(tokens);
            text.split('\n')
                .enumerate()
                .map(|(idx, line)| {
                    let prefix = if idx == 0 { "> " } else { "  " };
                    format!("{prefix}{line}")
                })
                .collect()
        }
        RecordContent::Text(text) => {
            let text = text.strip_suffix('\n').unwrap_or(text.as_str());
            if text.is_empty() {
                Vec::new()
            } else {
                text.split('\n').map(str::to_string).collect()
            }
        }
        RecordContent::UnexpectedError { title, issue_url } => {
            vec![title.clone(), format!("{ISSUE_LINK_LABEL} {issue_url}")]
        }
    }
}

#[cfg(test)]
mod tests {
    use promptline_core::{HighlightToken, RecordId};

    use super::*;

    fn record(kind: RecordKind, content: RecordContent) -> OutputRecord {
        OutputRecord {
            id: RecordId(0),
            kind,
            content,
            interactive: true,
        }
    }

    #[test]
    fn test_input_lines_are_prefixed() {
        let rec = record(
            RecordKind::Input,
            RecordContent::Highlighted(vec![HighlightToken::plain("f(\n  x)")]),
        );
        assert_eq!(record_lines(&rec), ["> f(", "    x)"]);
    }

    #[test]
    fn test_trailing_newline_is_dropped() {
        let rec = record(RecordKind::Output, RecordContent::Text("a\nb\n".to_string()));
        assert_eq!(record_lines(&rec), ["a", "b"]);
        let empty = record(RecordKind::Output, RecordContent::Text(String::new()));
        assert!(record_lines(&empty).is_empty());
    }
}
