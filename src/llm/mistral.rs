// src/llm/mistral.rs
use async_trait::async_trait;

use super::chat::ChatCompletionsClient;
use super::{ChatRequest, Completion, LlmError, LlmProvider};

const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
const MISTRAL_MODEL: &str = "mistral-medium-latest";
const MISTRAL_COST_PER_TOKEN: f64 = 0.000_003;

pub struct MistralProvider {
    chat: ChatCompletionsClient,
}

impl MistralProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            chat: ChatCompletionsClient::new(MISTRAL_BASE_URL, api_key, MISTRAL_MODEL, timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmProvider for MistralProvider {
    fn name(&self) -> &'static str {
        "Mistral AI"
    }

    fn model(&self) -> &str {
        self.chat.model()
    }

    fn cost_per_token(&self) -> f64 {
        MISTRAL_COST_PER_TOKEN
    }

    async fn complete(&self, request: ChatRequest) -> Result<Completion, LlmError> {
        self.chat.complete(request).await
    }
}
