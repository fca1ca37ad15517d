// ============================================================
// ANNOTATED TABLE WRITER
// ============================================================
// Write a tagged review table as UTF-8 CSV with a BOM, so spreadsheet
// tools pick the right encoding for CJK text

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::table::ReviewTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct AnnotatedWriter;

impl AnnotatedWriter {
    pub fn write(table: &ReviewTable, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| {
            AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
        })?;
        Self::write_to(table, file)?;
        info!(path = %path.display(), rows = table.len(), "Annotated table written");
        Ok(())
    }

    pub fn write_to<W: Write>(table: &ReviewTable, mut sink: W) -> Result<()> {
        sink.write_all(UTF8_BOM)?;

        let mut writer = WriterBuilder::new().flexible(true).from_writer(sink);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.values_padded(table.headers.len()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{CsvField, ReviewRow};

    #[test]
    fn test_output_starts_with_bom_and_quotes_commas() {
        let table = ReviewTable::new(
            vec!["评论".to_string(), "标签".to_string()],
            vec![ReviewRow::new(
                0,
                vec![CsvField::new("评论", "好"), CsvField::new("标签", "甲,乙")],
            )],
        );

        let mut buffer = Vec::new();
        AnnotatedWriter::write_to(&table, &mut buffer).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "评论,标签\n好,\"甲,乙\"\n");
    }
}
