//! Provider selection
//!
//! Pure and deterministic: selection depends only on the credential set and
//! the optional preference, never on request content. DeepSeek is the
//! cost-preferred default. An explicit preference wins when its key is
//! configured; a preference naming a provider without a key falls through to
//! the default ordering instead of hard-failing.

use crate::config::LlmConfig;
use crate::llm::ProviderKind;

/// The provider picked for one call, with its credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderChoice {
    pub provider: ProviderKind,
    pub api_key: String,
}

/// Pick exactly one (provider, key) pair, or None when no key is configured
pub fn select_provider(
    preference: Option<ProviderKind>,
    config: &LlmConfig,
) -> Option<ProviderChoice> {
    if let Some(preferred) = preference {
        if let Some(key) = key_for(preferred, config) {
            return Some(ProviderChoice {
                provider: preferred,
                api_key: key,
            });
        }
    }

    // Default priority: deepseek, then openai, then anthropic
    for provider in [
        ProviderKind::DeepSeek,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
    ] {
        if let Some(key) = key_for(provider, config) {
            return Some(ProviderChoice {
                provider,
                api_key: key,
            });
        }
    }

    None
}

fn key_for(provider: ProviderKind, config: &LlmConfig) -> Option<String> {
    match provider {
        ProviderKind::OpenAi => config.openai_api_key.clone(),
        ProviderKind::Anthropic => config.anthropic_api_key.clone(),
        ProviderKind::DeepSeek => config.deepseek_api_key.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        openai: Option<&str>,
        anthropic: Option<&str>,
        deepseek: Option<&str>,
    ) -> LlmConfig {
        LlmConfig {
            openai_api_key: openai.map(str::to_string),
            anthropic_api_key: anthropic.map(str::to_string),
            deepseek_api_key: deepseek.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_key_selected_without_preference() {
        let cases = [
            (config(Some("ok"), None, None), ProviderKind::OpenAi),
            (config(None, Some("ak"), None), ProviderKind::Anthropic),
            (config(None, None, Some("dk")), ProviderKind::DeepSeek),
        ];
        for (cfg, expected) in cases {
            let choice = select_provider(None, &cfg).unwrap();
            assert_eq!(choice.provider, expected);
        }
    }

    #[test]
    fn test_deepseek_is_default_when_all_present() {
        let cfg = config(Some("ok"), Some("ak"), Some("dk"));
        let choice = select_provider(None, &cfg).unwrap();
        assert_eq!(choice.provider, ProviderKind::DeepSeek);
        assert_eq!(choice.api_key, "dk");
    }

    #[test]
    fn test_preference_overrides_default_priority() {
        let cfg = config(Some("ok"), Some("ak"), Some("dk"));
        let choice = select_provider(Some(ProviderKind::Anthropic), &cfg).unwrap();
        assert_eq!(choice.provider, ProviderKind::Anthropic);
        assert_eq!(choice.api_key, "ak");
    }

    #[test]
    fn test_preference_without_key_falls_through() {
        let cfg = config(None, None, Some("dk"));
        let choice = select_provider(Some(ProviderKind::OpenAi), &cfg).unwrap();
        assert_eq!(choice.provider, ProviderKind::DeepSeek);
    }

    #[test]
    fn test_no_keys_is_unconfigured_regardless_of_preference() {
        let cfg = config(None, None, None);
        assert!(select_provider(None, &cfg).is_none());
        assert!(select_provider(Some(ProviderKind::DeepSeek), &cfg).is_none());
        assert!(select_provider(Some(ProviderKind::OpenAi), &cfg).is_none());
    }

    #[test]
    fn test_openai_preferred_over_anthropic_without_deepseek() {
        let cfg = config(Some("ok"), Some("ak"), None);
        let choice = select_provider(None, &cfg).unwrap();
        assert_eq!(choice.provider, ProviderKind::OpenAi);
    }
}
