//! Share links for submitted snippets.
//!
//! The snippet is base64-encoded (standard alphabet, padding stripped) into
//! the `expr` query parameter of a host-configured base URL. Only encoding
//! is provided.

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use url::Url;

pub const SHARE_PARAM: &str = "expr";

pub fn encode_expr(text: &str) -> String {
    STANDARD_NO_PAD.encode(text.as_bytes())
}

/// Builds the share URL for `text`, keeping other query parameters of `base`.
pub fn share_url(base: &str, text: &str) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid share base URL {base}"))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(SHARE_PARAM, &encode_expr(text));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_strips_padding() {
        assert_eq!(encode_expr("hi"), "aGk");
        assert_eq!(encode_expr("1+1"), "MSsx");
        assert_eq!(encode_expr(""), "");
    }

    #[test]
    fn test_keeps_other_params_and_replaces_expr() {
        let url = share_url("https://example.org/repl/?lang=r&expr=old", "hi").unwrap();
        assert_eq!(url.as_str(), "https://example.org/repl/?lang=r&expr=aGk");
    }

    #[test]
    fn test_plus_is_percent_encoded() {
        let url = share_url("https://example.org/", ">>>").unwrap();
        assert_eq!(url.query(), Some("expr=Pj4%2B"));
    }

    #[test]
    fn test_invalid_base_is_an_error() {
        assert!(share_url("not a url", "x").is_err());
    }
}
