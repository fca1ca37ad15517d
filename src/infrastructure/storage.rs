use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::error::{AppError, Result};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const INPUT_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}

pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("input")
        .to_string()
}

/// Artifact paths of one tagging run, all stamped with the same timestamp
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub annotated_csv: PathBuf,
    pub persona: PathBuf,
    pub word_frequency: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    pub fn for_input(output_dir: &Path, input: &Path, timestamp: &str) -> Self {
        let processed = format!("processed_{}_{}", file_stem(input), timestamp);
        Self {
            annotated_csv: output_dir.join(format!("{}.csv", processed)),
            persona: output_dir.join(format!("{}_persona_{}.md", processed, timestamp)),
            word_frequency: output_dir
                .join(format!("{}_word_frequency_{}.json", processed, timestamp)),
            summary: output_dir.join(format!("{}_summary.json", processed)),
        }
    }
}

/// `<output dir>/<stem>_report_analysis.md`
pub fn report_path(output_dir: &Path, input: &Path) -> PathBuf {
    output_dir.join(format!("{}_report_analysis.md", file_stem(input)))
}

/// Table files next to `input`, for diagnostics when a run fails.
pub fn list_candidate_inputs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| INPUT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
