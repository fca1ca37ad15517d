use crate::domain::analysis::{DimensionResult, TagCount};

pub const REPORT_TITLE: &str = "# 定量分析报告";
const TABLE_HEADER: &str = "| 维度 | 出现次数 | 正面 | 负面 | 中性/建议 | 占比 |";
const TABLE_SEPARATOR: &str = "|------|---------|------|------|----------|-----|";
const TOTAL_LABEL: &str = "合计";

/// Renders aggregated counts as Markdown tables
pub struct ReportRenderer;

impl ReportRenderer {
    /// One `## dimension` section: tags by descending occurrence, then the
    /// dimension total as a bold line below the table.
    pub fn render(dimension_name: &str, result: &DimensionResult) -> String {
        let totals = result.total();
        let total = totals.total();

        let mut entries: Vec<(&str, &TagCount)> = result.iter().collect();
        // sort_by is stable: equal totals keep first-seen order
        entries.sort_by(|a, b| b.1.total().cmp(&a.1.total()));

        let mut section = format!("## {}\n{}\n{}\n", dimension_name, TABLE_HEADER, TABLE_SEPARATOR);
        for (tag, counts) in entries {
            section.push_str(&row(tag, counts, total));
        }
        section.push_str(&format!(
            "\n**{}**：{}（正面 {}，负面 {}，中性/建议 {}）\n",
            TOTAL_LABEL, total, totals.positive, totals.negative, totals.neutral
        ));
        section
    }

    /// Full document: title plus sections separated by blank lines.
    pub fn render_document(sections: &[String]) -> String {
        std::iter::once(REPORT_TITLE.to_string())
            .chain(sections.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn row(label: &str, counts: &TagCount, dimension_total: u64) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        label,
        counts.total(),
        counts.positive,
        counts.negative,
        counts.neutral,
        share(counts.total(), dimension_total)
    )
}

/// Percentage with one decimal; `0.0%` when there is nothing to divide by.
pub fn share(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}
