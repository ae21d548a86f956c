//! Provider implementations
//!
//! OpenAI and DeepSeek speak the same chat-completions wire format (DeepSeek
//! on an alternate base URL); Anthropic has a distinct message/response
//! shape. All three reduce to the raw completion text behind the
//! `ChatCompletion` trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatCompletion, CompletionRequest, ProviderKind};
use crate::error::ProviderError;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEEPSEEK_CHAT_URL: &str = "https://api.deepseek.com/chat/completions";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

// ---------------------------------------------------------------------------
// OpenAI-compatible wire format (OpenAI, DeepSeek)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<WireMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

impl ResponseFormat {
    fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

async fn chat_completions_call(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    model: &str,
    request: &CompletionRequest,
) -> Result<String, ProviderError> {
    let body = ChatCompletionsRequest {
        model: model.to_string(),
        messages: vec![
            WireMessage {
                role: "system".to_string(),
                content: request.system.clone(),
            },
            WireMessage {
                role: "user".to_string(),
                content: request.user.clone(),
            },
        ],
        response_format: ResponseFormat::json_object(),
    };

    debug!("Sending chat completion request to {}", url);

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api { status, body });
    }

    let completion: ChatCompletionsResponse = response
        .json()
        .await
        .map_err(ProviderError::Transport)?;

    Ok(completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .unwrap_or_default())
}

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model_override: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model_override.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        chat_completions_call(
            &self.client,
            OPENAI_CHAT_URL,
            &self.api_key,
            &self.model,
            request,
        )
        .await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

/// DeepSeek provider; OpenAI-compatible wire format on an alternate base URL
pub struct DeepSeekProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl DeepSeekProvider {
    pub fn new(api_key: String, model_override: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model_override.unwrap_or_else(|| DEFAULT_DEEPSEEK_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl ChatCompletion for DeepSeekProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        chat_completions_call(
            &self.client,
            DEEPSEEK_CHAT_URL,
            &self.api_key,
            &self.model,
            request,
        )
        .await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }
}

// ---------------------------------------------------------------------------
// Anthropic wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Anthropic messages provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, model_override: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model_override.unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl ChatCompletion for AnthropicProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system.clone(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: request.user.clone(),
            }],
        };

        debug!("Sending messages request to Anthropic API");

        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(ProviderError::Transport)?;

        Ok(completion
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .unwrap_or_default())
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Scripted provider for tests: returns a fixed completion or a fixed error,
/// and records the requests it received
pub struct MockProvider {
    kind: ProviderKind,
    response: Result<String, (u16, String)>,
    requests: std::sync::Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Provider that always returns `content`
    pub fn returning(content: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::DeepSeek,
            response: Ok(content.into()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Provider that always fails with an API error
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::DeepSeek,
            response: Err((status, body.into())),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// The most recent request this provider received
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatCompletion for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.response {
            Ok(content) => Ok(content.clone()),
            Err((status, body)) => Err(ProviderError::Api {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }
}
