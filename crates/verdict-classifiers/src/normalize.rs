//! Canonical form used for all pattern matching

use regex::Regex;
use std::sync::OnceLock;

/// Reduce text to lower-case alphanumerics.
///
/// Parenthesized letter-only runs such as `(ResponseA)` are dropped first:
/// models echo them as asides and they would otherwise fire patterns.
pub fn normalize(text: &str) -> String {
    static PARENTHESIZED: OnceLock<Regex> = OnceLock::new();
    let parenthesized =
        PARENTHESIZED.get_or_init(|| Regex::new(r"(?:\([a-zA-Z]*\))+").unwrap());

    parenthesized
        .replace_all(text, "")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
