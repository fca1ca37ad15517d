// ============================================================
// DIMENSION AGGREGATOR
// ============================================================
// Count tags of one dimension column, split by the row's sentiment

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::tag_validator::TagValidator;
use crate::domain::analysis::{AggregationMode, AnalysisConfig, DimensionResult, Polarity};
use crate::domain::table::ReviewRow;

static TAG_SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,，]").unwrap());

pub struct DimensionAggregator {
    mode: AggregationMode,
    no_match_sentinel: String,
}

impl DimensionAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            mode: config.mode,
            no_match_sentinel: config.no_match_sentinel.clone(),
        }
    }

    /// Walk `rows` once and accumulate per-tag counts.
    ///
    /// Rows without a tag cell are skipped. A row with any invalid tag
    /// contributes nothing.
    pub fn aggregate(
        &self,
        rows: &[ReviewRow],
        tag_column: &str,
        sentiment_column: &str,
    ) -> DimensionResult {
        let mut result = DimensionResult::new();
        let mut rejected = 0usize;

        for row in rows {
            let Some(raw) = row.cell(tag_column) else {
                continue;
            };
            let cell = normalize_cell(raw);
            let pieces: Vec<&str> = TAG_SEPARATOR_PATTERN
                .split(cell.trim())
                .map(str::trim)
                .collect();

            let candidates: Vec<&str> = pieces
                .iter()
                .copied()
                .filter(|tag| !tag.is_empty() && *tag != self.no_match_sentinel)
                .collect();

            let invalid = TagValidator::invalid(&candidates);
            if !invalid.is_empty() {
                warn!(row = row.index + 1, tags = ?invalid, raw = %raw, "Invalid tags, row skipped");
                rejected += 1;
                continue;
            }

            let sentiment = row
                .value(sentiment_column)
                .map(normalize_cell)
                .unwrap_or_default();
            let polarity = Polarity::from_sentiment_text(&sentiment);

            match self.mode {
                AggregationMode::Strict => {
                    for tag in candidates {
                        result.record(tag, polarity);
                    }
                }
                AggregationMode::Legacy => {
                    if let Some(last) = pieces.last() {
                        result.record(last, polarity);
                    }
                }
            }
        }

        debug!(
            column = tag_column,
            tags = result.len(),
            rejected,
            "Dimension aggregated"
        );
        result
    }
}

/// Embedded newlines become spaces and doubled quotes collapse to one.
pub fn normalize_cell(value: &str) -> String {
    value
        .replace("\r\n", " ")
        .replace('\n', " ")
        .replace("\"\"", "\"")
}
