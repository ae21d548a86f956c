//! Configuration for the reader-critic service
//!
//! Built once from environment variables at process start and passed by
//! reference into the selector and gateway. Absence of every provider key is
//! a valid, handled state; requests then fail with an UNCONFIGURED error
//! rather than the process refusing to boot.

use serde::{Deserialize, Serialize};

/// Environment variables recognized for provider credentials
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";

/// Optional provider preference and per-provider model overrides
pub const ENV_LLM_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
pub const ENV_DEEPSEEK_MODEL: &str = "DEEPSEEK_MODEL";

/// Configuration for the reader-critic service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider credentials and overrides
    pub llm: LlmConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

/// Provider credentials and model overrides
///
/// Keys are held in memory only; they are never serialized into responses or
/// written to logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI API key, if configured
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Anthropic API key, if configured
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,

    /// DeepSeek API key, if configured
    #[serde(skip_serializing)]
    pub deepseek_api_key: Option<String>,

    /// Raw provider preference string; unrecognized values mean no preference
    pub provider_preference: Option<String>,

    /// Model override for OpenAI calls
    pub openai_model: Option<String>,

    /// Model override for Anthropic calls
    pub anthropic_model: Option<String>,

    /// Model override for DeepSeek calls
    pub deepseek_model: Option<String>,
}

impl LlmConfig {
    /// True when at least one provider credential is present
    pub fn has_any_key(&self) -> bool {
        self.openai_api_key.is_some()
            || self.anthropic_api_key.is_some()
            || self.deepseek_api_key.is_some()
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Config {
    /// Build configuration from process environment variables
    pub fn from_env() -> Self {
        let port = env_var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| ServerConfig::default().port);

        Self {
            llm: LlmConfig {
                openai_api_key: env_var(ENV_OPENAI_API_KEY),
                anthropic_api_key: env_var(ENV_ANTHROPIC_API_KEY),
                deepseek_api_key: env_var(ENV_DEEPSEEK_API_KEY),
                provider_preference: env_var(ENV_LLM_PROVIDER),
                openai_model: env_var(ENV_OPENAI_MODEL),
                anthropic_model: env_var(ENV_ANTHROPIC_MODEL),
                deepseek_model: env_var(ENV_DEEPSEEK_MODEL),
            },
            server: ServerConfig { port },
        }
    }
}

/// Read an environment variable, treating empty strings as absent
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
