//! Error types and provider-failure classification
//!
//! Raw provider failures carry status codes and arbitrarily large bodies;
//! `classify` reduces them to a small set of user-actionable categories with
//! canned remediation messages. Classification reads only common status/code
//! fields, never provider identity, so adding a provider needs no changes
//! here.

use serde::Serialize;

/// Fixed remediation message for quota/rate-limit failures
pub const QUOTA_MESSAGE: &str = "当前 API 配额已用尽或未开通计费。请到服务商控制台检查用量与账单；若已配置其他提供商，可设置环境变量 LLM_PROVIDER 切换（支持 deepseek、openai、anthropic）。";

/// Fixed remediation message for credential failures
pub const INVALID_KEY_MESSAGE: &str = "API Key 无效或已失效，请检查环境变量中配置的密钥。";

/// Fixed remediation message when no provider credential is configured
pub const UNCONFIGURED_MESSAGE: &str = "未配置 LLM：请设置环境变量 DEEPSEEK_API_KEY（推荐）、OPENAI_API_KEY 或 ANTHROPIC_API_KEY。";

/// Cap on provider message text echoed back to the end user
const MAX_USER_MESSAGE_CHARS: usize = 200;

/// Machine-readable error categories a UI can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    RateLimitOrQuota,
    InvalidCredential,
    GenericProviderFailure,
    EmptyModelOutput,
    MalformedModelOutput,
    Unconfigured,
}

impl ErrorCategory {
    /// Stable code string, identical to the serialized form
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimitOrQuota => "RATE_LIMIT_OR_QUOTA",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::GenericProviderFailure => "GENERIC_PROVIDER_FAILURE",
            Self::EmptyModelOutput => "EMPTY_MODEL_OUTPUT",
            Self::MalformedModelOutput => "MALFORMED_MODEL_OUTPUT",
            Self::Unconfigured => "UNCONFIGURED",
        }
    }
}

/// Raw failure from a provider invocation, before classification
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}

impl ProviderError {
    /// HTTP status of the failure, when one is known
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
        }
    }
}

/// Classified, user-facing failure from the gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Unconfigured(String),

    #[error("{0}")]
    RateLimitOrQuota(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    EmptyModelOutput(String),

    #[error("{0}")]
    MalformedModelOutput(String),
}

impl GatewayError {
    /// No usable credential; fixed remediation naming the accepted variables
    pub fn unconfigured() -> Self {
        Self::Unconfigured(UNCONFIGURED_MESSAGE.to_string())
    }

    /// Category code for the caller to branch on
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unconfigured(_) => ErrorCategory::Unconfigured,
            Self::RateLimitOrQuota(_) => ErrorCategory::RateLimitOrQuota,
            Self::InvalidCredential(_) => ErrorCategory::InvalidCredential,
            Self::Provider(_) => ErrorCategory::GenericProviderFailure,
            Self::EmptyModelOutput(_) => ErrorCategory::EmptyModelOutput,
            Self::MalformedModelOutput(_) => ErrorCategory::MalformedModelOutput,
        }
    }
}

/// Map a raw provider failure to a classified, user-facing error.
///
/// First match wins: 429/quota → `RateLimitOrQuota`, 401/invalid key →
/// `InvalidCredential`, everything else → `Provider` with the message
/// truncated so arbitrarily large provider payloads never reach the user.
pub fn classify(err: ProviderError) -> GatewayError {
    let status = err.status();
    let text = err.to_string();

    if status == Some(429)
        || text.contains("429")
        || text.contains("quota")
        || text.contains("insufficient_quota")
    {
        return GatewayError::RateLimitOrQuota(QUOTA_MESSAGE.to_string());
    }

    if status == Some(401) || text.contains("invalid_api_key") {
        return GatewayError::InvalidCredential(INVALID_KEY_MESSAGE.to_string());
    }

    GatewayError::Provider(format!(
        "API 调用失败：{}",
        truncate_chars(&text, MAX_USER_MESSAGE_CHARS)
    ))
}

/// Truncate to at most `max` chars, appending an ellipsis when cut
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}
