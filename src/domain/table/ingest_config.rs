// ============================================================
// INGEST CONFIGURATION
// ============================================================
// Limits and heuristics for reading review tables

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for review table ingestion and corpus sampling
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IngestConfig {
    /// Rows beyond this count are ignored (default: 300)
    #[validate(range(min = 1))]
    pub max_rows: usize,

    /// Header names that hold review text, tried exactly then by containment
    pub review_column_candidates: Vec<String>,

    /// Minimum average cell length for the longest-text heuristic (default: 20)
    pub min_review_length: usize,

    /// Column index used when detection fails (default: 10, clamped to the last column)
    pub fallback_review_column: usize,

    /// Reviews sampled for tag system generation (default: 100)
    #[validate(range(min = 1))]
    pub taxonomy_sample_reviews: usize,

    /// Character budget of the tag system corpus (default: 15000)
    #[validate(range(min = 1))]
    pub taxonomy_char_budget: usize,

    /// Reviews sampled for persona generation (default: 50)
    #[validate(range(min = 1))]
    pub persona_sample_reviews: usize,

    /// Character budget of the persona corpus (default: 10000)
    #[validate(range(min = 1))]
    pub persona_char_budget: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_rows: 300,
            review_column_candidates: [
                "typography_body-l__v5JLj",
                "cr-original-review-content (2)",
                "review_content",
                "review",
                "comment",
                "content",
                "body",
                "text",
                "message",
                "评论内容",
                "评论",
                "内容",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_review_length: 20,
            fallback_review_column: 10,
            taxonomy_sample_reviews: 100,
            taxonomy_char_budget: 15000,
            persona_sample_reviews: 50,
            persona_char_budget: 10000,
        }
    }
}
