use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retries unavailable-endpoint failures with a linearly growing pause
/// (`attempt * retry_backoff_ms`). Other errors are returned at once.
pub struct RetryingClient {
    inner: Arc<dyn LLMClient + Send + Sync>,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LLMClient for RetryingClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let attempts = config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.inner.generate(config, system, user).await {
                Ok(text) => return Ok(text),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(attempt, attempts, error = %err, "LLM call failed");
                    last_error = Some(err);
                    if attempt < attempts {
                        let pause = config.retry_backoff_ms * u64::from(attempt);
                        tokio::time::sleep(Duration::from_millis(pause)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::LLMError("LLM call was never attempted".to_string())))
    }
}
