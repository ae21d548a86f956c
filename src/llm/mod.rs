//! LLM orchestration: provider selection, completion, response parsing

pub mod gateway;
pub mod parse;
pub mod providers;
pub mod select;

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::ProviderError;

pub use gateway::LlmGateway;
pub use providers::{AnthropicProvider, DeepSeekProvider, MockProvider, OpenAiProvider};
pub use select::{select_provider, ProviderChoice};

/// LLM provider vendors the gateway can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    DeepSeek,
}

impl ProviderKind {
    /// Parse a preference string; unrecognized values yield None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    /// Lowercase vendor name, for logs and messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::DeepSeek => "deepseek",
        }
    }
}

/// One chat-completion invocation: fixed system instruction plus user content
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction enforcing role and output schema
    pub system: String,
    /// User message carrying the (possibly truncated) document text
    pub user: String,
    /// Output token cap, honored by providers whose API requires one
    pub max_tokens: u32,
}

/// A chat-completion backend. Each provider builds its own wire request and
/// reduces the vendor response to the raw completion text.
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
    fn kind(&self) -> ProviderKind;
}

/// Construct the provider implementation for a selection result
pub fn create_provider(choice: ProviderChoice, config: &LlmConfig) -> Box<dyn ChatCompletion> {
    match choice.provider {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(
            choice.api_key,
            config.openai_model.clone(),
        )),
        ProviderKind::DeepSeek => Box::new(DeepSeekProvider::new(
            choice.api_key,
            config.deepseek_model.clone(),
        )),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
            choice.api_key,
            config.anthropic_model.clone(),
        )),
    }
}
