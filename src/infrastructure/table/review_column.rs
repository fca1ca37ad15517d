// ============================================================
// REVIEW COLUMN DETECTION
// ============================================================
// Locate the column that carries the free-text review

use crate::domain::error::{AppError, Result};
use crate::domain::table::{IngestConfig, ReviewTable};
use serde::Serialize;

/// How the review column was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDetection {
    /// Header equals a known candidate
    Exact,
    /// Header and a candidate contain one another (case-insensitive)
    Contains,
    /// Column with the longest average text
    LongestText,
    /// Configured fallback index
    FallbackIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewColumn {
    pub index: usize,
    pub name: String,
    pub detection: ColumnDetection,
}

/// Detects the review text column of a table
pub struct ReviewColumnDetector {
    config: IngestConfig,
}

impl ReviewColumnDetector {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, table: &ReviewTable) -> Result<ReviewColumn> {
        if table.headers.is_empty() {
            return Err(AppError::ValidationError(
                "Table has no columns to read reviews from".to_string(),
            ));
        }

        let found = |index: usize, detection| ReviewColumn {
            index,
            name: table.headers[index].clone(),
            detection,
        };

        if let Some(index) = self.exact_match(&table.headers) {
            return Ok(found(index, ColumnDetection::Exact));
        }
        if let Some(index) = self.contains_match(&table.headers) {
            return Ok(found(index, ColumnDetection::Contains));
        }
        if let Some(index) = self.longest_text(table) {
            return Ok(found(index, ColumnDetection::LongestText));
        }

        let index = self.config.fallback_review_column.min(table.headers.len() - 1);
        Ok(found(index, ColumnDetection::FallbackIndex))
    }

    fn exact_match(&self, headers: &[String]) -> Option<usize> {
        headers.iter().position(|header| {
            self.config
                .review_column_candidates
                .iter()
                .any(|candidate| candidate == header.trim())
        })
    }

    fn contains_match(&self, headers: &[String]) -> Option<usize> {
        headers.iter().position(|header| {
            let header = header.trim().to_lowercase();
            if header.is_empty() {
                return false;
            }
            self.config.review_column_candidates.iter().any(|candidate| {
                let candidate = candidate.to_lowercase();
                header.contains(&candidate) || candidate.contains(&header)
            })
        })
    }

    /// Column whose non-blank cells are longest on average, if long enough to be prose.
    fn longest_text(&self, table: &ReviewTable) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;

        for (index, header) in table.headers.iter().enumerate() {
            let lengths: Vec<usize> = table
                .rows
                .iter()
                .filter_map(|row| row.value(header))
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.chars().count())
                .collect();
            if lengths.is_empty() {
                continue;
            }

            let avg = lengths.iter().sum::<usize>() as f32 / lengths.len() as f32;
            if avg < self.config.min_review_length as f32 {
                continue;
            }
            if best.map_or(true, |(_, best_avg)| avg > best_avg) {
                best = Some((index, avg));
            }
        }

        best.map(|(index, _)| index)
    }
}

impl Default for ReviewColumnDetector {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> ReviewTable {
        ReviewTable::from_records(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_exact_candidate_wins() {
        let t = table(&["id", "review_content", "评论"], &[&["1", "good", "好"]]);
        let column = ReviewColumnDetector::default().detect(&t).unwrap();

        assert_eq!(column.index, 1);
        assert_eq!(column.detection, ColumnDetection::Exact);
    }

    #[test]
    fn test_contains_match_is_case_insensitive() {
        let t = table(&["id", "Customer Review Text"], &[&["1", "good"]]);
        let column = ReviewColumnDetector::default().detect(&t).unwrap();

        assert_eq!(column.name, "Customer Review Text");
        assert_eq!(column.detection, ColumnDetection::Contains);
    }

    #[test]
    fn test_longest_text_heuristic() {
        let t = table(
            &["编号", "正文描述"],
            &[
                &["1", "这个吸尘器吸力很强，但是噪音有点大，晚上使用会吵到家里人休息"],
                &["2", "包装很好，物流也很快，客服回复及时，整体体验非常满意值得推荐"],
            ],
        );
        let column = ReviewColumnDetector::default().detect(&t).unwrap();

        assert_eq!(column.index, 1);
        assert_eq!(column.detection, ColumnDetection::LongestText);
    }

    #[test]
    fn test_fallback_index_is_clamped() {
        let t = table(&["编号", "日期", "星级"], &[&["1", "2", "3"]]);
        let column = ReviewColumnDetector::default().detect(&t).unwrap();

        assert_eq!(column.index, 2);
        assert_eq!(column.detection, ColumnDetection::FallbackIndex);
    }
}
