// ============================================================
// TABLE READER
// ============================================================
// Read CSV (with encoding detection) or spreadsheet files into a ReviewTable

use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::table::ReviewTable;

/// Reads review tables from disk
pub struct TableReader {
    /// Rows beyond this count are ignored
    max_rows: usize,
}

impl TableReader {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Read a `.csv` or spreadsheet file, dispatching on the extension
    pub fn read(&self, path: &Path) -> Result<ReviewTable> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => self.read_workbook(path),
            _ => self.read_csv_file(path),
        }
    }

    fn read_csv_file(&self, path: &Path) -> Result<ReviewTable> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let content = decode_text(&bytes);
        self.parse_content(&content)
    }

    /// Parse CSV text, auto-detecting the delimiter
    pub fn parse_content(&self, content: &str) -> Result<ReviewTable> {
        let delimiter = detect_delimiter(content);
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::ParseError("CSV file is empty".to_string()));
        }

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            records.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(self.build_table(headers, records))
    }

    fn read_workbook(&self, path: &Path) -> Result<ReviewTable> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            AppError::ParseError(format!("Failed to open workbook {}: {}", path.display(), e))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
            .map_err(|e| AppError::ParseError(format!("Failed to read worksheet: {}", e)))?;

        let mut rows = range.rows().map(|row| {
            row.iter()
                .map(|cell| {
                    cell.as_string()
                        .unwrap_or_else(|| format!("{}", cell))
                        .trim()
                        .to_string()
                })
                .collect::<Vec<String>>()
        });

        let headers = rows
            .next()
            .filter(|h| h.iter().any(|v| !v.is_empty()))
            .ok_or_else(|| AppError::ParseError("Worksheet is empty".to_string()))?;

        Ok(self.build_table(headers, rows.collect()))
    }

    fn build_table(&self, headers: Vec<String>, mut records: Vec<Vec<String>>) -> ReviewTable {
        if records.len() > self.max_rows {
            warn!(
                rows = records.len(),
                max_rows = self.max_rows,
                "Input exceeds row limit, extra rows ignored"
            );
            records.truncate(self.max_rows);
        }
        debug!(columns = headers.len(), rows = records.len(), "Table loaded");
        ReviewTable::from_records(headers, records)
    }
}

/// Decode bytes as UTF-8 (BOM stripped), falling back to GB18030.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Ok(content) = std::str::from_utf8(bytes) {
        return content.trim_start_matches('\u{feff}').to_string();
    }

    let (content, _, had_errors) = encoding_rs::GB18030.decode(bytes);
    if had_errors {
        warn!("Input is neither valid UTF-8 nor GB18030; undecodable bytes replaced");
    } else {
        debug!("Input decoded as GB18030");
    }
    content.into_owned()
}

/// Detect delimiter from content (comma, semicolon, tab, pipe)
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    if sample_lines.is_empty() {
        return best_delimiter;
    }

    for &delimiter in &candidates {
        // Multi-byte UTF-8 sequences never contain ASCII bytes, so bytes are safe to scan
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;

        // Consistent and frequent delimiters score highest
        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "评论,情感,标签\n很好用,正面,清洁效果\n有噪音,负面,噪音";
        let table = TableReader::new(300).parse_content(content).unwrap();

        assert_eq!(table.headers, vec!["评论", "情感", "标签"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].value("标签"), Some("噪音"));
    }

    #[test]
    fn test_quoted_cells_keep_commas_and_newlines() {
        let content = "评论,标签\n\"第一行\n第二行\",\"甲,乙\"";
        let table = TableReader::new(300).parse_content(content).unwrap();

        assert_eq!(table.rows[0].value("评论"), Some("第一行\n第二行"));
        assert_eq!(table.rows[0].value("标签"), Some("甲,乙"));
    }

    #[test]
    fn test_rows_beyond_limit_are_ignored() {
        let content = "评论\n一\n二\n三";
        let table = TableReader::new(2).parse_content(content).unwrap();

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_content_is_an_error() {
        assert!(TableReader::new(10).parse_content("").is_err());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("评论\t情感\n好\t正面"), b'\t');
    }

    #[test]
    fn test_decode_gb18030_fallback() {
        let (encoded, _, _) = encoding_rs::GB18030.encode("评论,情感\n好,正面");
        assert!(std::str::from_utf8(&encoded).is_err());

        assert_eq!(decode_text(&encoded), "评论,情感\n好,正面");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let bytes = "\u{feff}评论\n好".as_bytes();
        assert_eq!(decode_text(bytes), "评论\n好");
    }

    #[test]
    fn test_read_csv_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("review-voc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("reviews.csv");
        std::fs::write(&path, "评论,情感\n很好,正面\n").unwrap();

        let table = TableReader::new(300).read(&path).unwrap();
        assert_eq!(table.rows[0].value("情感"), Some("正面"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
