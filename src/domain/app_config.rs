use crate::domain::analysis::AnalysisConfig;
use crate::domain::column_roles::RolePatterns;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::table::IngestConfig;
use crate::domain::taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads").join("processed"),
        }
    }
}

/// Everything a run needs, passed explicitly into the use cases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub llm: LLMConfig,
    pub taxonomy: Taxonomy,
    pub columns: RolePatterns,
    pub analysis: AnalysisConfig,
    #[validate(nested)]
    pub ingest: IngestConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))?;
        self.taxonomy
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid taxonomy: {}", e)))?;
        if self.columns.rules.is_empty() {
            return Err(AppError::ConfigError(
                "columns.rules must contain at least one role rule".to_string(),
            ));
        }
        Ok(())
    }
}
