// ============================================================
// WORD FREQUENCY
// ============================================================
// Tag occurrence counts per derived column, from per-review results

use serde::Serialize;

use crate::domain::analysis::{DimensionResult, Polarity, TagCount};
use crate::domain::taxonomy::{TagSystem, Taxonomy};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagFrequency {
    pub tag: String,
    pub count: u64,
    /// Marker-derived split of `count`
    pub polarity: TagCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFrequency {
    pub column: String,
    pub dimension: String,
    /// Sorted by descending count; ties keep first-seen order
    pub tags: Vec<TagFrequency>,
    pub sentiment: TagCount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WordFrequencyReport {
    pub columns: Vec<ColumnFrequency>,
}

impl WordFrequencyReport {
    pub fn column(&self, name: &str) -> Option<&ColumnFrequency> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Highest counts across every column, with the column each came from.
    pub fn top_tags(&self, limit: usize) -> Vec<(&str, &TagFrequency)> {
        let mut all: Vec<(&str, &TagFrequency)> = self
            .columns
            .iter()
            .flat_map(|c| c.tags.iter().map(move |t| (c.column.as_str(), t)))
            .collect();
        all.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        all.truncate(limit);
        all
    }
}

pub struct WordFrequencyCounter;

impl WordFrequencyCounter {
    pub fn count(taxonomy: &Taxonomy, results: &[TagSystem]) -> WordFrequencyReport {
        let columns = taxonomy
            .column_paths()
            .into_iter()
            .map(|(dimension, column)| {
                let mut counts = DimensionResult::new();
                for result in results {
                    for raw in result.tags(dimension, column) {
                        let (polarity, bare) = Polarity::split_marker(raw);
                        if !bare.is_empty() {
                            counts.record(&bare, polarity);
                        }
                    }
                }
                column_frequency(dimension, column, &counts)
            })
            .collect();

        WordFrequencyReport { columns }
    }
}

fn column_frequency(dimension: &str, column: &str, counts: &DimensionResult) -> ColumnFrequency {
    let mut tags: Vec<TagFrequency> = counts
        .iter()
        .map(|(tag, polarity)| TagFrequency {
            tag: tag.to_string(),
            count: polarity.total(),
            polarity: *polarity,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count));

    ColumnFrequency {
        column: column.to_string(),
        dimension: dimension.to_string(),
        tags,
        sentiment: counts.total(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(tags: &[&str]) -> TagSystem {
        let mut system = Taxonomy::default().empty_tag_system();
        system.insert(
            "体验价值",
            "价格感知",
            tags.iter().map(|s| s.to_string()).collect(),
        );
        system
    }

    #[test]
    fn test_counts_strip_markers_and_sort() {
        let results = vec![
            review(&["[正面]实惠", "[负面]偏贵"]),
            review(&["[负面]偏贵"]),
            review(&["[positive]实惠", "[Negative]偏贵"]),
        ];
        let report = WordFrequencyCounter::count(&Taxonomy::default(), &results);
        let price = report.column("价格感知").unwrap();

        assert_eq!(price.dimension, "体验价值");
        assert_eq!(price.tags[0].tag, "偏贵");
        assert_eq!(price.tags[0].count, 3);
        assert_eq!(price.tags[1].tag, "实惠");
        assert_eq!(price.tags[1].polarity, TagCount::new(2, 0, 0));
        assert_eq!(price.sentiment, TagCount::new(2, 3, 0));
    }

    #[test]
    fn test_every_derived_column_is_present() {
        let report = WordFrequencyCounter::count(&Taxonomy::default(), &[]);

        assert_eq!(report.columns.len(), 16);
        assert!(report.columns.iter().all(|c| c.tags.is_empty()));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let results = vec![review(&["乙", "甲"])];
        let report = WordFrequencyCounter::count(&Taxonomy::default(), &results);
        let tags: Vec<&str> = report.columns[15].tags.iter().map(|t| t.tag.as_str()).collect();

        assert_eq!(tags, vec!["乙", "甲"]);
        assert_eq!(report.columns[15].sentiment, TagCount::new(0, 0, 2));
    }

    #[test]
    fn test_top_tags_across_columns() {
        let mut system = review(&["实惠", "实惠"]);
        system.insert("功能价值", "产品反馈-产品优点", vec!["吸力强".to_string()]);
        let report = WordFrequencyCounter::count(&Taxonomy::default(), &[system]);

        let top = report.top_tags(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].0, "价格感知");
        assert_eq!(top[0].1.tag, "实惠");
    }
}
