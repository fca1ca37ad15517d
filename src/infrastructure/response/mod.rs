use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::error::{AppError, Result};

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static JSON_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap());

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strips reasoning blocks some models prepend to the answer
pub fn clean_llm_response(response: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(response, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    MULTIPLE_NEWLINES_PATTERN
        .replace_all(cleaned.trim(), "\n\n")
        .to_string()
}

/// Pulls the JSON object out of a model answer.
///
/// Tries the whole answer, then a fenced ```json block, then the span from
/// the first `{` to the last `}`.
pub fn extract_json_payload(response: &str) -> Result<Value> {
    let cleaned = clean_llm_response(response);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    if let Some(body) = JSON_FENCE_PATTERN
        .captures(&cleaned)
        .and_then(|c| c.get(1))
    {
        if let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&cleaned[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(AppError::ParseError(
        "Model answer does not contain a JSON object".to_string(),
    ))
}
