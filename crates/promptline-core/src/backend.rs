//! Language backend seam.

use anyhow::Result;

use crate::diagnostics::Diagnostic;
use crate::highlight::HighlightToken;

/// Host-supplied language support.
///
/// Only `evaluate` is required. Without a highlighter the prompt shows the
/// buffer as one plain token, and without a validator every buffer is
/// considered ready to submit.
pub trait Backend {
    /// Runs `code` and returns its final output.
    ///
    /// `sink` may be called any number of times before returning to stream
    /// partial output into the record being built.
    fn evaluate(&mut self, code: &str, sink: &mut dyn FnMut(&str)) -> Result<String>;

    /// Splits `code` into styled tokens whose texts concatenate to `code`.
    fn highlight(&self, code: &str) -> Result<Vec<HighlightToken>> {
        Ok(vec![HighlightToken::plain(code)])
    }

    /// Returns the problems that keep `code` from being submitted.
    fn validate(&self, _code: &str) -> Result<Vec<Diagnostic>> {
        Ok(Vec::new())
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn evaluate(&mut self, code: &str, sink: &mut dyn FnMut(&str)) -> Result<String> {
        (**self).evaluate(code, sink)
    }

    fn highlight(&self, code: &str) -> Result<Vec<HighlightToken>> {
        (**self).highlight(code)
    }

    fn validate(&self, code: &str) -> Result<Vec<Diagnostic>> {
        (**self).validate(code)
    }
}

