use serde::{Deserialize, Serialize};
use validator::Validate;

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct LLMConfig {
    #[validate(length(min = 1))]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Per-request timeout; the only timeout boundary around the classifier.
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    /// Total attempts per request, including the first one.
    #[validate(range(min = 1, max = 10))]
    pub max_retries: u32,
    /// Linear backoff unit: attempt `n` waits `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            max_tokens: Some(4096),
            temperature: Some(0.7),
            timeout_secs: 180,
            max_retries: 3,
            retry_backoff_ms: 2000,
        }
    }
}

impl LLMConfig {
    pub fn with_temperature(&self, temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..self.clone()
        }
    }

    pub fn chat_completions_url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}chat/completions", self.base_url)
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }
}
