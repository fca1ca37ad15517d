// ============================================================
// REVIEW ROW TYPES
// ============================================================
// Data structures representing one decoded review table

use serde::{Deserialize, Serialize};

/// A single named cell in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvField {
    /// Column name (header)
    pub name: String,

    /// Cell value as decoded
    pub value: String,
}

impl CsvField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One review: ordered column -> value mapping.
///
/// Rows only grow: derived columns are appended, existing cells never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    /// Row index (0-based, header excluded)
    pub index: usize,

    fields: Vec<CsvField>,
}

impl ReviewRow {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        Self { index, fields }
    }

    /// Build a row by zipping headers with values; missing trailing values are omitted.
    pub fn from_values(index: usize, headers: &[String], values: &[String]) -> Self {
        let fields = headers
            .iter()
            .zip(values.iter())
            .map(|(name, value)| CsvField::new(name.clone(), value.clone()))
            .collect();
        Self::new(index, fields)
    }

    pub fn fields(&self) -> &[CsvField] {
        &self.fields
    }

    /// Raw value of the first column named `column`, if the row has one.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == column)
            .map(|f| f.value.as_str())
    }

    /// Value of `column`, treating an empty cell like a missing one.
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.value(column).filter(|v| !v.is_empty())
    }

    /// Add empty cells for headers past the end of a short row, so derived
    /// columns land after every original column.
    pub fn fill_missing(&mut self, headers: &[String]) {
        for name in headers.iter().skip(self.fields.len()) {
            self.fields.push(CsvField::new(name.clone(), ""));
        }
    }

    /// Append a derived column.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(CsvField::new(name, value));
    }

    /// Values in column order, padded to `width` with empty strings.
    pub fn values_padded(&self, width: usize) -> Vec<String> {
        let mut values: Vec<String> = self.fields.iter().map(|f| f.value.clone()).collect();
        if values.len() < width {
            values.resize(width, String::new());
        }
        values
    }
}

/// A fully decoded input table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewTable {
    /// Header row, in file order
    pub headers: Vec<String>,

    /// Data rows
    pub rows: Vec<ReviewRow>,
}

impl ReviewTable {
    pub fn new(headers: Vec<String>, rows: Vec<ReviewRow>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from raw records (header excluded).
    pub fn from_records(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let rows = records
            .iter()
            .enumerate()
            .map(|(index, values)| ReviewRow::from_values(index, &headers, values))
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_record_has_no_trailing_fields() {
        let table = ReviewTable::from_records(
            headers(&["评论", "情感", "标签"]),
            vec![vec!["很好用".to_string(), "正面".to_string()]],
        );

        let row = &table.rows[0];
        assert_eq!(row.value("情感"), Some("正面"));
        assert_eq!(row.value("标签"), None);
        assert_eq!(row.values_padded(3), vec!["很好用", "正面", ""]);
    }

    #[test]
    fn test_fill_missing_before_append() {
        let names = headers(&["评论", "情感", "标签"]);
        let mut row = ReviewRow::from_values(0, &names, &["好".to_string()]);
        row.fill_missing(&names);
        row.append("价格感知", "实惠");

        assert_eq!(row.values_padded(4), vec!["好", "", "", "实惠"]);
    }

    #[test]
    fn test_cell_treats_empty_as_missing() {
        let row = ReviewRow::new(
            0,
            vec![CsvField::new("标签", ""), CsvField::new("情感", " ")],
        );

        assert_eq!(row.cell("标签"), None);
        assert_eq!(row.cell("情感"), Some(" "));
    }

    #[test]
    fn test_append_derived_column() {
        let mut row = ReviewRow::new(3, vec![CsvField::new("评论", "不错")]);
        row.append("价格感知", "[正面]实惠");

        assert_eq!(row.index, 3);
        assert_eq!(row.value("价格感知"), Some("[正面]实惠"));
        assert_eq!(row.fields().len(), 2);
    }
}
