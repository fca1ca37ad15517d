pub mod openai;
pub mod retry;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;

pub use openai::OpenAIClient;
pub use retry::RetryingClient;

#[async_trait]
pub trait LLMClient {
    /// Send one system/user exchange and return the raw completion text.
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;
}
