//! Input boundary: turning user text into keys
//!
//! Tokens that are not finite numbers are dropped silently; the count of
//! dropped tokens is kept for logging only.

use tracing::debug;

use crate::domain::Key;

/// Keys parsed from a comma-separated list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedKeys {
    pub keys: Vec<Key>,
    /// Tokens that did not parse to a finite number
    pub discarded: usize,
}

/// Parse a comma-separated list such as `"5, 3, x, 8"`.
pub fn parse_keys(raw: &str) -> ParsedKeys {
    let mut parsed = ParsedKeys::default();
    for token in raw.split(',') {
        match parse_key(token) {
            Some(key) => parsed.keys.push(key),
            None => parsed.discarded += 1,
        }
    }
    if parsed.discarded > 0 {
        debug!("parse_keys: discarded {} token(s) in {:?}", parsed.discarded, raw);
    }
    parsed
}

/// Parse a single numeric token.
pub fn parse_key(raw: &str) -> Option<Key> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<f64>().ok().and_then(|v| Key::new(v).ok())
}
