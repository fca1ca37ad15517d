// ============================================================
// REVIEW TAGGING
// ============================================================
// Tag system derivation, per-review tagging and persona generation
// through an LLM, behind an injectable classifier trait

pub mod prompts;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::taxonomy::{TagSystem, Taxonomy};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::{clean_llm_response, extract_json_payload};
use crate::shared::text_budget::estimate_tokens;

const TAGGING_TEMPERATURE: f32 = 0.3;

/// The external classification collaborator.
#[async_trait]
pub trait ReviewClassifier {
    /// Corpus-wide three-level tag system.
    async fn derive_taxonomy(&self, corpus: &str) -> Result<TagSystem>;

    /// Tags of one review, shaped like `tag_system`, leaves carrying polarity markers.
    async fn tag_review(&self, review: &str, tag_system: &TagSystem) -> Result<TagSystem>;

    /// Markdown persona summary.
    async fn persona(&self, corpus: &str) -> Result<String>;
}

pub struct LlmReviewClassifier {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
    taxonomy: Taxonomy,
}

impl LlmReviewClassifier {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        config: LLMConfig,
        taxonomy: Taxonomy,
    ) -> Self {
        Self {
            llm_client,
            config,
            taxonomy,
        }
    }

    async fn ask(&self, config: &LLMConfig, prompt: &str) -> Result<String> {
        debug!(tokens = estimate_tokens(prompt), "Prompt prepared");
        let started = Instant::now();
        let answer = self.llm_client.generate(config, "", prompt).await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = answer.chars().count(),
            "LLM answered"
        );
        Ok(answer)
    }
}

#[async_trait]
impl ReviewClassifier for LlmReviewClassifier {
    async fn derive_taxonomy(&self, corpus: &str) -> Result<TagSystem> {
        let prompt = prompts::tag_system_prompt(&self.taxonomy, corpus);
        let answer = self.ask(&self.config, &prompt).await?;

        let system = match extract_json_payload(&answer) {
            Ok(payload @ Value::Object(_)) => TagSystem::from_payload(&payload, &self.taxonomy),
            Ok(_) | Err(_) => {
                warn!("Tag system answer is not a JSON object, using the empty catalog");
                self.taxonomy.empty_tag_system()
            }
        };

        info!(tags = system.tag_count(), "Tag system derived");
        Ok(system)
    }

    async fn tag_review(&self, review: &str, tag_system: &TagSystem) -> Result<TagSystem> {
        let prompt = prompts::review_tagging_prompt(tag_system, review);
        let config = self.config.with_temperature(TAGGING_TEMPERATURE);
        let answer = self.ask(&config, &prompt).await?;

        match extract_json_payload(&answer)? {
            payload @ Value::Object(_) => Ok(TagSystem::project(&payload, tag_system)),
            _ => Err(AppError::ParseError(
                "Review tags answer is not a JSON object".to_string(),
            )),
        }
    }

    async fn persona(&self, corpus: &str) -> Result<String> {
        let prompt = prompts::persona_prompt(corpus);
        let answer = clean_llm_response(&self.ask(&self.config, &prompt).await?);
        if answer.is_empty() {
            return Err(AppError::LLMError("Persona answer is empty".to_string()));
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns canned answers in order and records the temperature of each call.
    struct ScriptedClient {
        answers: Mutex<Vec<String>>,
        temperatures: Mutex<Vec<Option<f32>>>,
    }

    impl ScriptedClient {
        fn new(answers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().rev().map(|s| s.to_string()).collect()),
                temperatures: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn generate(&self, config: &LLMConfig, _: &str, _: &str) -> Result<String> {
            self.temperatures.lock().unwrap().push(config.temperature);
            self.answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AppError::LLMError("script exhausted".to_string()))
        }
    }

    fn classifier(client: Arc<ScriptedClient>) -> LlmReviewClassifier {
        LlmReviewClassifier::new(client, LLMConfig::default(), Taxonomy::default())
    }

    #[tokio::test]
    async fn test_derive_taxonomy_fills_catalog() {
        let client = ScriptedClient::new(&[
            "```json\n{\"体验价值\": {\"价格感知\": [\"性价比\"]}, \"其他\": {}}\n```",
        ]);
        let system = classifier(client).derive_taxonomy("很划算").await.unwrap();

        assert_eq!(system.tags("体验价值", "价格感知"), ["性价比".to_string()]);
        assert!(system.tags("功能价值", "产品反馈-产品优点").is_empty());
        assert_eq!(system.dimensions().count(), 4);
    }

    #[tokio::test]
    async fn test_derive_taxonomy_falls_back_on_garbage() {
        let client = ScriptedClient::new(&["抱歉，我无法完成"]);
        let system = classifier(client).derive_taxonomy("语料").await.unwrap();

        assert_eq!(system, Taxonomy::default().empty_tag_system());
    }

    #[tokio::test]
    async fn test_tag_review_projects_and_lowers_temperature() {
        let client = ScriptedClient::new(&[
            r#"{"体验价值": {"价格感知": ["[正面]性价比"], "新增": ["[负面]x"]}}"#,
        ]);
        let mut reference = TagSystem::new();
        reference.insert("体验价值", "价格感知", vec!["性价比".to_string()]);

        let tags = classifier(client.clone())
            .tag_review("很划算", &reference)
            .await
            .unwrap();

        assert_eq!(tags.tags("体验价值", "价格感知"), ["[正面]性价比".to_string()]);
        assert!(tags.tags("体验价值", "新增").is_empty());
        assert_eq!(*client.temperatures.lock().unwrap(), vec![Some(0.3)]);
    }

    #[tokio::test]
    async fn test_tag_review_rejects_non_object() {
        let client = ScriptedClient::new(&["[1, 2, 3]"]);
        let result = classifier(client)
            .tag_review("评论", &TagSystem::new())
            .await;

        assert!(matches!(result, Err(AppError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_persona_is_cleaned() {
        let client = ScriptedClient::new(&["<think>推理</think>\n## 画像一\n宝妈"]);
        let persona = classifier(client).persona("语料").await.unwrap();

        assert_eq!(persona, "## 画像一\n宝妈");
    }
}
