// src/llm/mod.rs
//! Chat-completion capability behind one trait, with an OpenAI and a
//! Mistral strategy selected by configuration.

mod chat;
pub mod mistral;
pub mod openai;
pub mod structured;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::config_manager::LlmConfig;

pub use mistral::MistralProvider;
pub use openai::OpenAiProvider;
pub use structured::{parse_structured, parse_structured_list, StructuredOutputError};

/// Token count assumed for pricing when the provider reports no usage.
const DEFAULT_BILLED_TOKENS: u32 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("The model returned an empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: None,
            temperature: 0.2,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn total_tokens(&self) -> Option<u32> {
        self.usage.map(|u| u.total_tokens)
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Display name, e.g. "Mistral AI".
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Blended price in dollars, used for the cost estimate in responses.
    fn cost_per_token(&self) -> f64;

    async fn complete(&self, request: ChatRequest) -> Result<Completion, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Mistral,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Result<Self, LlmError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Ok(Self::OpenAi),
            "mistral" | "mistralai" => Ok(Self::Mistral),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }
}

/// Build the configured provider. A missing key yields `MissingApiKey`, which
/// callers turn into a configuration error on the routes that need the model.
pub fn provider_from_config(
    config: &LlmConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let kind = ProviderKind::from_name(&config.provider)?;

    let provider: Arc<dyn LlmProvider> = match kind {
        ProviderKind::OpenAi => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or(LlmError::MissingApiKey("OpenAI"))?;
            Arc::new(OpenAiProvider::new(key, timeout_secs)?)
        }
        ProviderKind::Mistral => {
            let key = config
                .mistral_api_key
                .clone()
                .ok_or(LlmError::MissingApiKey("Mistral AI"))?;
            Arc::new(MistralProvider::new(key, timeout_secs)?)
        }
    };

    info!("LLM provider ready: {} ({})", provider.name(), provider.model());
    Ok(provider)
}

/// Same as [`provider_from_config`] but logs and swallows a missing key.
pub fn optional_provider(
    config: &LlmConfig,
    timeout_secs: u64,
) -> Result<Option<Arc<dyn LlmProvider>>, LlmError> {
    match provider_from_config(config, timeout_secs) {
        Ok(provider) => Ok(Some(provider)),
        Err(LlmError::MissingApiKey(name)) => {
            warn!("{} API key not configured", name);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Dollar estimate formatted with six decimals.
pub fn estimate_cost(tokens: Option<u32>, cost_per_token: f64) -> String {
    let tokens = tokens.unwrap_or(DEFAULT_BILLED_TOKENS);
    format!("{:.6}", f64::from(tokens) * cost_per_token)
}
