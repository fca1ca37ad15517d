//! Character whitelist for aggregated tags.
//!
//! A tag may only contain CJK ideographs (U+4E00..U+9FA5), digits, hyphen,
//! slash, the enumeration comma, ASCII/full-width commas and parentheses,
//! and whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{4E00}-\x{9FA5}\d\-/、，,（）()\s]+$").unwrap());

pub struct TagValidator;

impl TagValidator {
    /// True iff `tag` is non-empty and every character is whitelisted.
    pub fn validate(tag: &str) -> bool {
        TAG_PATTERN.is_match(tag)
    }

    /// The candidates of `tags` that fail validation, in input order.
    pub fn invalid<'a>(tags: &[&'a str]) -> Vec<&'a str> {
        tags.iter()
            .copied()
            .filter(|tag| !Self::validate(tag))
            .collect()
    }
}
