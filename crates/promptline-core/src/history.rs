//! Submitted-input history with cyclic Up/Down browsing.

/// Browsing direction through the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward earlier submissions (Up).
    Older,
    /// Toward later submissions (Down).
    Newer,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Older => -1,
            Direction::Newer => 1,
        }
    }
}

/// Append-only log of submitted inputs.
///
/// `selected` is `None` outside a browsing session. The first step of a
/// session starts from index 0, so the first `Older` lands on the newest entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
    selected: Option<usize>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a submitted input. Callers never push empty submissions.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Steps through the log, wrapping at both ends.
    ///
    /// Returns `None` (and leaves `selected` unset) when the log is empty.
    pub fn navigate(&mut self, direction: Direction) -> Option<&str> {
        let n = self.entries.len();
        if n == 0 {
            return None;
        }

        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + direction.step()).rem_euclid(n as isize) as usize;
        self.selected = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// Ends the current browsing session.
    pub fn reset(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(entries: &[&str]) -> HistoryLog {
        let mut log = HistoryLog::new();
        for entry in entries {
            log.push(*entry);
        }
        log
    }

    #[test]
    fn test_empty_log_navigation_is_noop() {
        let mut log = HistoryLog::new();
        assert_eq!(log.navigate(Direction::Older), None);
        assert_eq!(log.navigate(Direction::Newer), None);
        assert_eq!(log.selected(), None);
    }

    #[test]
    fn test_older_then_newer_walks_back_and_forth() {
        let mut log = log(&["a", "b", "c"]);
        assert_eq!(log.navigate(Direction::Older), Some("c"));
        assert_eq!(log.navigate(Direction::Older), Some("b"));
        assert_eq!(log.navigate(Direction::Newer), Some("c"));
    }

    #[test]
    fn test_navigation_cycles_with_period_len() {
        let mut log = log(&["a", "b", "c", "d"]);
        let first = log.navigate(Direction::Older).map(str::to_string);
        for _ in 0..3 {
            log.navigate(Direction::Older);
        }
        assert_eq!(log.navigate(Direction::Older).map(str::to_string), first);
    }

    #[test]
    fn test_newer_wraps_to_oldest_after_newest() {
        let mut log = log(&["a", "b"]);
        assert_eq!(log.navigate(Direction::Older), Some("b"));
        assert_eq!(log.navigate(Direction::Newer), Some("a"));
    }

    #[test]
    fn test_reset_restarts_from_newest() {
        let mut log = log(&["a", "b", "c"]);
        log.navigate(Direction::Older);
        log.navigate(Direction::Older);
        log.reset();
        assert_eq!(log.selected(), None);
        assert_eq!(log.navigate(Direction::Older), Some("c"));
    }

    #[test]
    fn test_push_keeps_submission_order() {
        let mut log = log(&["x"]);
        log.push("y");
        assert_eq!(log.entries(), ["x".to_string(), "y".to_string()]);
        assert_eq!(log.len(), 2);
    }
}
