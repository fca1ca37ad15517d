//! Corpus sampling for prompts.
//!
//! Joins at most `max_items` texts and cuts the result to `max_chars`
//! characters, never splitting a UTF-8 sequence.

pub const CORPUS_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBudget {
    pub max_items: usize,
    pub max_chars: usize,
}

impl TextBudget {
    pub fn new(max_items: usize, max_chars: usize) -> Self {
        Self {
            max_items,
            max_chars,
        }
    }

    pub fn join<S: AsRef<str>>(&self, items: &[S]) -> String {
        let joined = items
            .iter()
            .take(self.max_items)
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(CORPUS_SEPARATOR);
        truncate_chars(&joined, self.max_chars).to_string()
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Rough token estimate (~4 bytes per token), used for logging prompt sizes.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() + 3) / 4
}
