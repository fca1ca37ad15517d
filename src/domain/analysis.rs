use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static POLARITY_MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(正面|负面|positive|negative)\]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    /// Neutral or suggestion
    Neutral,
}

impl Polarity {
    /// Classifies a free-text sentiment cell: positive wins over negative,
    /// anything without either keyword is neutral.
    pub fn from_sentiment_text(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        if lower.contains("正面") || lower.contains("positive") {
            Polarity::Positive
        } else if lower.contains("负面") || lower.contains("negative") {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }

    /// Splits a marked tag such as `[正面]清洁效果` into its polarity and bare text.
    pub fn split_marker(tag: &str) -> (Polarity, String) {
        let polarity = POLARITY_MARKER_PATTERN
            .captures(tag)
            .and_then(|caps| caps.get(1))
            .map(|m| Self::from_sentiment_text(m.as_str()))
            .unwrap_or(Polarity::Neutral);
        let bare = POLARITY_MARKER_PATTERN.replace_all(tag, "").trim().to_string();
        (polarity, bare)
    }
}

/// Per-tag occurrence counts split by polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl TagCount {
    pub fn new(positive: u64, negative: u64, neutral: u64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    pub fn record(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Positive => self.positive += 1,
            Polarity::Negative => self.negative += 1,
            Polarity::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }
}

/// Tag -> counts for one dimension, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionResult {
    entries: Vec<(String, TagCount)>,
    index: HashMap<String, usize>,
}

impl DimensionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tag: &str, polarity: Polarity) {
        let slot = match self.index.get(tag) {
            Some(&slot) => slot,
            None => {
                self.entries.push((tag.to_string(), TagCount::default()));
                self.index.insert(tag.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.record(polarity);
    }

    pub fn get(&self, tag: &str) -> Option<&TagCount> {
        self.index.get(tag).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagCount)> {
        self.entries.iter().map(|(tag, count)| (tag.as_str(), count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all buckets of all tags.
    pub fn total(&self) -> TagCount {
        self.entries
            .iter()
            .fold(TagCount::default(), |acc, (_, count)| TagCount {
                positive: acc.positive + count.positive,
                negative: acc.negative + count.negative,
                neutral: acc.neutral + count.neutral,
            })
    }
}

/// How many tags of a multi-tag cell are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Every valid tag in the cell is counted.
    #[default]
    Strict,
    /// Only the last candidate of the cell is counted, whatever it is.
    Legacy,
}

impl std::str::FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(AggregationMode::Strict),
            "legacy" => Ok(AggregationMode::Legacy),
            other => Err(format!("unknown aggregation mode '{}'", other)),
        }
    }
}

/// What happens to a review whose classifier response cannot be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Row is left out of the annotated output.
    #[default]
    Drop,
    /// Row is written with empty derived columns.
    KeepEmpty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: AggregationMode,
    /// Placeholder the tagger writes when nothing matched
    pub no_match_sentinel: String,
    pub malformed_rows: MalformedRowPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::Strict,
            no_match_sentinel: "无匹配标签".to_string(),
            malformed_rows: MalformedRowPolicy::Drop,
        }
    }
}
