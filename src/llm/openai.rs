// src/llm/openai.rs
use async_trait::async_trait;

use super::chat::ChatCompletionsClient;
use super::{ChatRequest, Completion, LlmError, LlmProvider};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-4o-mini";
/// Blend of gpt-4o-mini input and output pricing.
const OPENAI_COST_PER_TOKEN: f64 = 0.000_000_6;

pub struct OpenAiProvider {
    chat: ChatCompletionsClient,
}

impl OpenAiProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            chat: ChatCompletionsClient::new(OPENAI_BASE_URL, api_key, OPENAI_MODEL, timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        self.chat.model()
    }

    fn cost_per_token(&self) -> f64 {
        OPENAI_COST_PER_TOKEN
    }

    async fn complete(&self, request: ChatRequest) -> Result<Completion, LlmError> {
        self.chat.complete(request).await
    }
}
