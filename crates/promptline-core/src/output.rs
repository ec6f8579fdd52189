//! Output region: the ordered records produced by submissions.

use crate::config::{OutputLocation, OutputMode};
use crate::highlight::{HighlightToken, source_text};

/// Stable identifier of a record within one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Input,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordContent {
    Text(String),
    Highlighted(Vec<HighlightToken>),
    /// Generic failure block shown instead of an evaluator error.
    UnexpectedError { title: String, issue_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub id: RecordId,
    pub kind: RecordKind,
    pub content: RecordContent,
    /// Whether clicking the record recalls it into the prompt.
    pub interactive: bool,
}

impl OutputRecord {
    /// Plain text of the record, as recalled into the prompt.
    pub fn text(&self) -> String {
        match &self.content {
            RecordContent::Text(text) => text.clone(),
            RecordContent::Highlighted(tokens) => source_text(tokens),
            RecordContent::UnexpectedError { title, .. } => title.clone(),
        }
    }
}

/// Ordered records plus the display mode and placement.
#[derive(Debug, Clone)]
pub struct OutputRegion {
    mode: OutputMode,
    location: OutputLocation,
    records: Vec<OutputRecord>,
    next_id: u64,
}

impl OutputRegion {
    pub fn new(mode: OutputMode, location: OutputLocation) -> Self {
        Self {
            mode,
            location,
            records: Vec::new(),
            next_id: 0,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn location(&self) -> OutputLocation {
        self.location
    }

    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&OutputRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn push(&mut self, kind: RecordKind, content: RecordContent, interactive: bool) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(OutputRecord {
            id,
            kind,
            content,
            interactive,
        });
        id
    }

    /// Appends streamed text to a text record. Other content is left alone.
    pub fn append_text(&mut self, id: RecordId, chunk: &str) {
        if let Some(RecordContent::Text(text)) = self.get_mut(id).map(|r| &mut r.content) {
            text.push_str(chunk);
        }
    }

    /// Swaps a record's kind and content in place, keeping its position.
    pub fn replace(&mut self, id: RecordId, kind: RecordKind, content: RecordContent) {
        if let Some(record) = self.get_mut(id) {
            record.kind = kind;
            record.content = content;
        }
    }

    /// Drops every record except `id`.
    pub fn retain_only(&mut self, id: RecordId) {
        self.records.retain(|r| r.id == id);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn get_mut(&mut self, id: RecordId) -> Option<&mut OutputRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }
}

impl Default for OutputRegion {
    fn default() -> Self {
        Self::new(OutputMode::default(), OutputLocation::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RecordContent {
        RecordContent::Text(s.to_string())
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut region = OutputRegion::default();
        let a = region.push(RecordKind::Input, text("a"), true);
        let b = region.push(RecordKind::Output, text("b"), true);
        region.clear();
        let c = region.push(RecordKind::Output, text("c"), true);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_append_streams_into_text_record() {
        let mut region = OutputRegion::default();
        let id = region.push(RecordKind::Output, text(""), true);
        region.append_text(id, "he");
        region.append_text(id, "llo");
        assert_eq!(region.get(id).map(OutputRecord::text).as_deref(), Some("hello"));
    }

    #[test]
    fn test_retain_only_keeps_one_record() {
        let mut region = OutputRegion::default();
        region.push(RecordKind::Input, text("x"), true);
        let keep = region.push(RecordKind::Output, text("y"), true);
        region.push(RecordKind::Output, text("z"), true);
        region.retain_only(keep);
        assert_eq!(region.len(), 1);
        assert_eq!(region.records()[0].id, keep);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut region = OutputRegion::default();
        region.push(RecordKind::Input, text("x"), true);
        let id = region.push(RecordKind::Output, text("partial"), true);
        region.replace(
            id,
            RecordKind::Error,
            RecordContent::UnexpectedError {
                title: "oops".into(),
                issue_url: "https://example.com".into(),
            },
        );
        assert_eq!(region.records()[1].kind, RecordKind::Error);
        assert_eq!(region.records()[1].text(), "oops");
    }

    #[test]
    fn test_highlighted_text_is_source() {
        let record = OutputRecord {
            id: RecordId(0),
            kind: RecordKind::Input,
            content: RecordContent::Highlighted(vec![
                HighlightToken::new("num", "1"),
                HighlightToken::new("op", "+"),
                HighlightToken::new("num", "1"),
            ]),
            interactive: true,
        };
        assert_eq!(record.text(), "1+1");
    }
}
