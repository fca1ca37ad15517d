// ============================================================
// QUANTITATIVE REPORT USE CASE
// ============================================================
// Resolve column roles, aggregate each value dimension and render
// the Markdown report

use std::path::{Path, PathBuf};

use tracing::info;

use super::column_resolver::ColumnResolver;
use super::dimension_aggregator::DimensionAggregator;
use super::report_renderer::ReportRenderer;
use crate::domain::analysis::DimensionResult;
use crate::domain::app_config::AppConfig;
use crate::domain::column_roles::ColumnRoleMap;
use crate::domain::error::{AppError, Result};
use crate::domain::table::ReviewTable;
use crate::domain::taxonomy::{Taxonomy, ValueDimension};
use crate::infrastructure::storage::{ensure_dir, report_path};
use crate::infrastructure::table::TableReader;

#[derive(Debug, Clone)]
pub struct DimensionSection {
    pub dimension: ValueDimension,
    pub name: String,
    pub column: String,
    pub result: DimensionResult,
}

#[derive(Debug, Clone)]
pub struct QuantReport {
    pub roles: ColumnRoleMap,
    pub sections: Vec<DimensionSection>,
    pub markdown: String,
}

pub struct QuantReportUseCase {
    reader: TableReader,
    resolver: ColumnResolver,
    aggregator: DimensionAggregator,
    taxonomy: Taxonomy,
    output_dir: PathBuf,
}

impl QuantReportUseCase {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            reader: TableReader::new(config.ingest.max_rows),
            resolver: ColumnResolver::new(&config.columns)?,
            aggregator: DimensionAggregator::new(&config.analysis),
            taxonomy: config.taxonomy.clone(),
            output_dir: config.output.dir.clone(),
        })
    }

    /// Build the report for an in-memory table. Fails only when column roles
    /// cannot be resolved.
    pub fn analyze(&self, table: &ReviewTable) -> Result<QuantReport> {
        let roles = self.resolver.resolve(&table.headers)?;

        let mut sections = Vec::with_capacity(ValueDimension::ALL.len());
        for dimension in ValueDimension::ALL {
            let spec = self.taxonomy.spec(dimension).ok_or_else(|| {
                AppError::ConfigError(format!("Taxonomy has no '{}' dimension", dimension))
            })?;
            let column = roles.column_for(dimension).to_string();
            let result = self
                .aggregator
                .aggregate(&table.rows, &column, &roles.sentiment.name);

            sections.push(DimensionSection {
                dimension,
                name: spec.name.clone(),
                column,
                result,
            });
        }

        let rendered: Vec<String> = sections
            .iter()
            .map(|s| ReportRenderer::render(&s.name, &s.result))
            .collect();
        let markdown = ReportRenderer::render_document(&rendered);

        Ok(QuantReport {
            roles,
            sections,
            markdown,
        })
    }

    /// Read `input`, build the report and write it next to the other outputs.
    pub fn run(&self, input: &Path) -> Result<(PathBuf, QuantReport)> {
        let table = self.reader.read(input)?;
        let report = self.analyze(&table)?;

        ensure_dir(&self.output_dir)?;
        let path = report_path(&self.output_dir, input);
        std::fs::write(&path, &report.markdown).map_err(|e| {
            AppError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), rows = table.len(), "Report written");
        Ok((path, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::TagCount;

    fn table(headers: &[&str], rows: &[&[&str]]) -> ReviewTable {
        ReviewTable::from_records(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_report_covers_all_dimensions() {
        let use_case = QuantReportUseCase::new(&AppConfig::default()).unwrap();
        let input = table(
            &["情感", "标签"],
            &[&["正面", "标签一"], &["负面", "标签二"], &["正面", "标签一,bad"]],
        );

        let report = use_case.analyze(&input).unwrap();

        assert_eq!(report.sections.len(), 4);
        let crowd = &report.sections[0].result;
        assert_eq!(crowd.get("标签一"), Some(&TagCount::new(1, 0, 0)));
        assert_eq!(crowd.get("标签二"), Some(&TagCount::new(0, 1, 0)));
        assert!(report.markdown.starts_with("# 定量分析报告\n\n## 人群与场景\n"));
        assert_eq!(report.markdown.matches("**合计**：2（正面 1，负面 1，中性/建议 0）").count(), 4);
    }

    #[test]
    fn test_category_column_backs_value_dimensions() {
        let use_case = QuantReportUseCase::new(&AppConfig::default()).unwrap();
        let input = table(
            &["情感", "标签", "功能分类"],
            &[&["正面", "送礼", "吸力"]],
        );

        let report = use_case.analyze(&input).unwrap();

        assert_eq!(report.sections[0].column, "标签");
        assert_eq!(report.sections[1].column, "功能分类");
        assert!(report.sections[3].result.get("吸力").is_some());
    }

    #[test]
    fn test_sentiment_counted_when_review_column_comes_first() {
        let use_case = QuantReportUseCase::new(&AppConfig::default()).unwrap();
        let input = table(
            &["评论内容", "情感分析", "标签"],
            &[&["质量太差了", "负面", "做工"], &["非常好用", "正面", "吸力"]],
        );

        let report = use_case.analyze(&input).unwrap();

        assert_eq!(report.roles.sentiment.name, "情感分析");
        let crowd = &report.sections[0].result;
        assert_eq!(crowd.get("做工"), Some(&TagCount::new(0, 1, 0)));
        assert_eq!(crowd.get("吸力"), Some(&TagCount::new(1, 0, 0)));
    }

    #[test]
    fn test_missing_sentiment_column_is_fatal() {
        let use_case = QuantReportUseCase::new(&AppConfig::default()).unwrap();
        let input = table(&["正文", "标签"], &[&["很好", "外观"]]);

        assert!(matches!(
            use_case.analyze(&input),
            Err(AppError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_run_writes_report_file() {
        let dir = std::env::temp_dir().join(format!("review-voc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("reviews.csv");
        std::fs::write(&input, "评分,关键词\n正面,续航\n").unwrap();

        let mut config = AppConfig::default();
        config.output.dir = dir.join("out");
        let (path, report) = QuantReportUseCase::new(&config).unwrap().run(&input).unwrap();

        assert_eq!(path, dir.join("out").join("reviews_report_analysis.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), report.markdown);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
