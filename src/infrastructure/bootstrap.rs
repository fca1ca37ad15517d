use std::sync::Arc;

use tracing::debug;

use crate::application::{LlmReviewClassifier, QuantReportUseCase, ReviewAnalysisUseCase};
use crate::domain::app_config::AppConfig;
use crate::domain::error::Result;
use crate::infrastructure::llm_clients::{LLMClient, OpenAIClient, RetryingClient};

/// Use cases wired for one process run
pub struct AppContext {
    pub config: AppConfig,
    pub review_analysis: ReviewAnalysisUseCase,
    pub quant_report: QuantReportUseCase,
}

pub fn setup(config: AppConfig) -> Result<AppContext> {
    let llm_client: Arc<dyn LLMClient + Send + Sync> =
        Arc::new(RetryingClient::new(Arc::new(OpenAIClient::new())));

    let classifier = Arc::new(LlmReviewClassifier::new(
        llm_client,
        config.llm.clone(),
        config.taxonomy.clone(),
    ));

    let review_analysis = ReviewAnalysisUseCase::new(classifier, &config);
    let quant_report = QuantReportUseCase::new(&config)?;

    debug!(
        model = %config.llm.model,
        output = %config.output.dir.display(),
        "Application context ready"
    );

    Ok(AppContext {
        config,
        review_analysis,
        quant_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::column_roles::RoleRule;
    use crate::domain::column_roles::ColumnRole;

    #[test]
    fn test_setup_with_defaults() {
        let context = setup(AppConfig::default()).unwrap();
        assert_eq!(context.config.ingest.max_rows, 300);
    }

    #[test]
    fn test_setup_rejects_bad_pattern() {
        let mut config = AppConfig::default();
        config.columns.rules.push(RoleRule {
            role: ColumnRole::Tag,
            pattern: "[".to_string(),
        });
        assert!(setup(config).is_err());
    }
}
