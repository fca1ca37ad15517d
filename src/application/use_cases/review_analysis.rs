// ============================================================
// REVIEW ANALYSIS USE CASE
// ============================================================
// Derive a tag system from the review corpus, tag every review,
// and write the annotated table, persona and word frequencies

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use super::review_tagging::ReviewClassifier;
use super::word_frequency::{WordFrequencyCounter, WordFrequencyReport};
use crate::domain::analysis::MalformedRowPolicy;
use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::table::{IngestConfig, ReviewTable};
use crate::domain::taxonomy::{TagSystem, Taxonomy};
use crate::infrastructure::storage::{ensure_dir, timestamp, OutputPaths};
use crate::infrastructure::table::{
    AnnotatedWriter, ReviewColumn, ReviewColumnDetector, TableReader,
};
use crate::shared::text_budget::TextBudget;

/// In-memory result of tagging one table
#[derive(Debug, Clone)]
pub struct TaggedTable {
    /// Original headers plus the derived columns
    pub table: ReviewTable,
    pub review_column: ReviewColumn,
    pub tag_system: TagSystem,
    /// Per-review tags of every successfully tagged row
    pub results: Vec<TagSystem>,
    pub persona: Option<String>,
    pub rows: usize,
    pub tagged: usize,
    pub skipped_empty: usize,
    pub failed: usize,
}

/// Printed as JSON at the end of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub generated_at: DateTime<Local>,
    pub input: PathBuf,
    pub review_column: ReviewColumn,
    pub rows: usize,
    pub tagged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub tag_system_size: usize,
    pub annotated_csv: PathBuf,
    pub persona: Option<PathBuf>,
    pub word_frequency: PathBuf,
    /// Most frequent tags across all derived columns
    pub top_tags: Vec<TopTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTag {
    pub column: String,
    pub tag: String,
    pub count: u64,
}

const TOP_TAG_LIMIT: usize = 10;

pub struct ReviewAnalysisUseCase {
    classifier: Arc<dyn ReviewClassifier + Send + Sync>,
    taxonomy: Taxonomy,
    ingest: IngestConfig,
    malformed_rows: MalformedRowPolicy,
    output_dir: PathBuf,
}

impl ReviewAnalysisUseCase {
    pub fn new(classifier: Arc<dyn ReviewClassifier + Send + Sync>, config: &AppConfig) -> Self {
        Self {
            classifier,
            taxonomy: config.taxonomy.clone(),
            ingest: config.ingest.clone(),
            malformed_rows: config.analysis.malformed_rows,
            output_dir: config.output.dir.clone(),
        }
    }

    pub async fn tag_table(&self, table: ReviewTable) -> Result<TaggedTable> {
        let review_column = ReviewColumnDetector::new(self.ingest.clone()).detect(&table)?;
        info!(
            column = %review_column.name,
            detection = ?review_column.detection,
            "Review column detected"
        );

        let reviews: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|row| row.value(&review_column.name))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect();
        if reviews.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Column '{}' holds no review text",
                review_column.name
            )));
        }

        let corpus = TextBudget::new(
            self.ingest.taxonomy_sample_reviews,
            self.ingest.taxonomy_char_budget,
        )
        .join(&reviews);
        let tag_system = self.classifier.derive_taxonomy(&corpus).await?;

        let persona_corpus = TextBudget::new(
            self.ingest.persona_sample_reviews,
            self.ingest.persona_char_budget,
        )
        .join(&reviews);
        let persona = match self.classifier.persona(&persona_corpus).await {
            Ok(persona) => Some(persona),
            Err(e) => {
                warn!(error = %e, "Persona generation failed, continuing without it");
                None
            }
        };

        let ReviewTable { headers, rows } = table;
        let paths = self.taxonomy.column_paths();
        let total = rows.len();

        let mut kept = Vec::with_capacity(total);
        let mut results = Vec::new();
        let mut skipped_empty = 0;
        let mut failed = 0;

        for mut row in rows {
            let review = row
                .value(&review_column.name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();

            let tags = if review.is_empty() {
                skipped_empty += 1;
                None
            } else {
                match self.classifier.tag_review(&review, &tag_system).await {
                    Ok(tags) => Some(tags),
                    Err(e) => {
                        warn!(row = row.index + 1, error = %e, "Review tagging failed");
                        failed += 1;
                        None
                    }
                }
            };

            if tags.is_none() && self.malformed_rows == MalformedRowPolicy::Drop {
                continue;
            }

            row.fill_missing(&headers);
            for (dimension, column) in &paths {
                let cell = tags
                    .as_ref()
                    .map(|t| t.tags(dimension, column).join(","))
                    .unwrap_or_default();
                row.append(*column, cell);
            }
            if let Some(tags) = tags {
                results.push(tags);
            }
            kept.push(row);
        }

        let tagged = results.len();
        info!(rows = total, tagged, skipped_empty, failed, "Reviews tagged");

        let mut headers = headers;
        headers.extend(paths.iter().map(|(_, column)| column.to_string()));

        Ok(TaggedTable {
            table: ReviewTable::new(headers, kept),
            review_column,
            tag_system,
            results,
            persona,
            rows: total,
            tagged,
            skipped_empty,
            failed,
        })
    }

    pub fn word_frequency(&self, tagged: &TaggedTable) -> WordFrequencyReport {
        WordFrequencyCounter::count(&self.taxonomy, &tagged.results)
    }

    /// Full pipeline over a file on disk.
    pub async fn run(&self, input: &Path) -> Result<RunSummary> {
        let table = TableReader::new(self.ingest.max_rows).read(input)?;
        let tagged = self.tag_table(table).await?;
        let frequency = self.word_frequency(&tagged);

        ensure_dir(&self.output_dir)?;
        let paths = OutputPaths::for_input(&self.output_dir, input, &timestamp());

        AnnotatedWriter::write(&tagged.table, &paths.annotated_csv)?;

        let persona = match &tagged.persona {
            Some(text) => {
                write_text(&paths.persona, text)?;
                Some(paths.persona.clone())
            }
            None => None,
        };

        write_text(&paths.word_frequency, &serde_json::to_string_pretty(&frequency)?)?;

        let top_tags: Vec<TopTag> = frequency
            .top_tags(TOP_TAG_LIMIT)
            .into_iter()
            .map(|(column, entry)| TopTag {
                column: column.to_string(),
                tag: entry.tag.clone(),
                count: entry.count,
            })
            .collect();
        if let Some(top) = top_tags.first() {
            info!(column = %top.column, tag = %top.tag, count = top.count, "Most frequent tag");
        }

        let summary = RunSummary {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Local::now(),
            input: input.to_path_buf(),
            review_column: tagged.review_column.clone(),
            rows: tagged.rows,
            tagged: tagged.tagged,
            skipped: tagged.skipped_empty,
            failed: tagged.failed,
            tag_system_size: tagged.tag_system.tag_count(),
            annotated_csv: paths.annotated_csv.clone(),
            persona,
            word_frequency: paths.word_frequency.clone(),
            top_tags,
        };
        write_text(&paths.summary, &serde_json::to_string_pretty(&summary)?)?;

        info!(run_id = %summary.run_id, output = %self.output_dir.display(), "Analysis finished");
        Ok(summary)
    }
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Tags reviews containing "坏" as negative 做工, others as positive 吸力;
    /// reviews containing "乱码" fail.
    struct StubClassifier {
        persona_fails: bool,
    }

    #[async_trait]
    impl ReviewClassifier for StubClassifier {
        async fn derive_taxonomy(&self, _corpus: &str) -> Result<TagSystem> {
            let mut system = Taxonomy::default().empty_tag_system();
            system.insert(
                "功能价值",
                "产品反馈-产品优点",
                vec!["吸力".to_string(), "做工".to_string()],
            );
            Ok(system)
        }

        async fn tag_review(&self, review: &str, tag_system: &TagSystem) -> Result<TagSystem> {
            if review.contains("乱码") {
                return Err(AppError::ParseError("not json".to_string()));
            }
            let mut tags = tag_system.clone();
            let tag = if review.contains('坏') {
                "[负面]做工"
            } else {
                "[正面]吸力"
            };
            tags.insert("功能价值", "产品反馈-产品优点", vec![tag.to_string()]);
            Ok(tags)
        }

        async fn persona(&self, corpus: &str) -> Result<String> {
            if self.persona_fails {
                return Err(AppError::LLMError("timeout".to_string()));
            }
            Ok(format!("## 画像\n{}", corpus.lines().count()))
        }
    }

    fn use_case(policy: MalformedRowPolicy, persona_fails: bool) -> ReviewAnalysisUseCase {
        let mut config = AppConfig::default();
        config.analysis.malformed_rows = policy;
        ReviewAnalysisUseCase::new(Arc::new(StubClassifier { persona_fails }), &config)
    }

    fn input() -> ReviewTable {
        ReviewTable::from_records(
            vec!["id".to_string(), "评论".to_string(), "星级".to_string()],
            vec![
                vec!["1".to_string(), "吸力很强".to_string(), "5".to_string()],
                vec!["2".to_string(), "".to_string(), "3".to_string()],
                vec!["3".to_string(), "用了一周就坏了".to_string()],
                vec!["4".to_string(), "乱码".to_string(), "1".to_string()],
            ],
        )
    }

    #[tokio::test]
    async fn test_drop_policy_omits_failed_and_empty_rows() {
        let tagged = use_case(MalformedRowPolicy::Drop, false)
            .tag_table(input())
            .await
            .unwrap();

        assert_eq!(tagged.review_column.name, "评论");
        assert_eq!(tagged.rows, 4);
        assert_eq!(tagged.tagged, 2);
        assert_eq!(tagged.skipped_empty, 1);
        assert_eq!(tagged.failed, 1);
        assert_eq!(tagged.table.headers.len(), 3 + 16);
        assert_eq!(tagged.table.len(), 2);

        let short_row = &tagged.table.rows[1];
        assert_eq!(short_row.value("星级"), Some(""));
        assert_eq!(short_row.value("产品反馈-产品优点"), Some("[负面]做工"));
        assert_eq!(short_row.values_padded(19).len(), 19);
    }

    #[tokio::test]
    async fn test_keep_empty_policy_writes_blank_derived_cells() {
        let tagged = use_case(MalformedRowPolicy::KeepEmpty, false)
            .tag_table(input())
            .await
            .unwrap();

        assert_eq!(tagged.table.len(), 4);
        let failed_row = &tagged.table.rows[3];
        assert_eq!(failed_row.value("id"), Some("4"));
        assert_eq!(failed_row.value("产品反馈-产品优点"), Some(""));
        assert_eq!(failed_row.fields().len(), 19);
    }

    #[tokio::test]
    async fn test_persona_failure_is_not_fatal() {
        let tagged = use_case(MalformedRowPolicy::Drop, true)
            .tag_table(input())
            .await
            .unwrap();

        assert!(tagged.persona.is_none());
        assert_eq!(tagged.tagged, 2);
    }

    #[tokio::test]
    async fn test_word_frequency_from_results() {
        let use_case = use_case(MalformedRowPolicy::Drop, false);
        let tagged = use_case.tag_table(input()).await.unwrap();
        let frequency = use_case.word_frequency(&tagged);

        let column = frequency.column("产品反馈-产品优点").unwrap();
        assert_eq!(column.tags.len(), 2);
        assert_eq!(column.sentiment.positive, 1);
        assert_eq!(column.sentiment.negative, 1);
    }

    #[tokio::test]
    async fn test_table_without_reviews_is_rejected() {
        let table = ReviewTable::from_records(
            vec!["评论".to_string()],
            vec![vec!["".to_string()]],
        );
        let result = use_case(MalformedRowPolicy::Drop, false).tag_table(table).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_run_writes_artifacts() {
        let dir = std::env::temp_dir().join(format!("review-voc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input_path = dir.join("reviews.csv");
        std::fs::write(&input_path, "评论,星级\n吸力很强,5\n用了一周就坏了,1\n").unwrap();

        let mut config = AppConfig::default();
        config.output.dir = dir.join("out");
        let use_case = ReviewAnalysisUseCase::new(
            Arc::new(StubClassifier {
                persona_fails: false,
            }),
            &config,
        );

        let summary = use_case.run(&input_path).await.unwrap();

        assert_eq!(summary.tagged, 2);
        let csv = std::fs::read(&summary.annotated_csv).unwrap();
        assert!(csv.starts_with(b"\xEF\xBB\xBF"));
        assert!(summary.persona.as_ref().map(|p| p.exists()).unwrap_or(false));
        assert!(summary.word_frequency.exists());
        let top: Vec<(&str, &str, u64)> = summary
            .top_tags
            .iter()
            .map(|t| (t.column.as_str(), t.tag.as_str(), t.count))
            .collect();
        assert_eq!(
            top,
            vec![("产品反馈-产品优点", "吸力", 1), ("产品反馈-产品优点", "做工", 1)]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
