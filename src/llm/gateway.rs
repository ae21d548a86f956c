//! The LLM gateway
//!
//! Orchestrates one provider round trip per operation: pick a provider,
//! truncate the document text, assemble the prompt pair, invoke the
//! completion endpoint, and normalize the response. A failure from the
//! selected provider is surfaced after classification; there is no
//! cross-provider fallback and no retry within a call.

use tracing::{debug, warn};

use super::parse;
use super::select::select_provider;
use super::{create_provider, ChatCompletion, CompletionRequest, ProviderKind};
use crate::config::LlmConfig;
use crate::error::{classify, GatewayError};
use crate::reader::{AnalyzeResult, ReaderFeedbackPayload};

/// Document text beyond this many chars is truncated before prompting
pub const MAX_TEXT_CHARS: usize = 12000;

/// Marker appended when document text is cut, so the model knows
pub const TRUNCATION_MARKER: &str = "\n\n[内容已截断…]";

const ANALYSIS_MAX_TOKENS: u32 = 1024;
const FEEDBACK_MAX_TOKENS: u32 = 2048;

const ANALYSIS_PROMPT: &str = r#"你是一位文档分析助手。根据下面提供的文档内容（可能被截断），分析并严格按以下 JSON 格式输出，不要包含其他文字或 markdown 标记：

{
  "theme": "文档主题（一句话概括）",
  "tone": "语气风格（如：正式、轻松、学术、口语化等）",
  "targetAudience": "目标用户（谁最适合阅读）",
  "suggestedReaders": [
    { "name": "读者身份名称", "description": "一句话描述该读者会如何审阅此文" },
    { "name": "读者身份名称", "description": "一句话描述" },
    { "name": "读者身份名称", "description": "一句话描述" }
  ]
}

要求：
- suggestedReaders 必须恰好 3 个，且具有区分度。
- 示例身份可参考：严苛的学术导师、挑剔的投资人、普通的吃瓜群众、领域专家、潜在客户、竞争对手等，根据文档内容选择最贴切的 3 种。
- 全部使用中文。"#;

const READER_FEEDBACK_PROMPT: &str = r#"你正在深度模拟一位特定读者，对下方文档给出真实、犀利的阅读反馈。你必须完全代入该读者身份（职业、立场、关注点、说话习惯），用该身份的口吻和标准评判文档。

反馈分为两部分：先写阅读感受，再写修改建议。必须严格按以下 JSON 格式输出，不要包含其他文字或 markdown 代码块标记：
{
  "firstImpressionScore": 1到10的整数,
  "firstImpressionReason": "一两句话说明为何打这个分数",
  "readingFeeling": "阅读感受：以该读者身份写一段整体感受，包括读下来的第一印象、哪些地方让你满意或不满意、阅读中的困惑或槽点（费解、逻辑不通、语气不适等）。可引用原文。使用 Markdown 格式。",
  "revisionSuggestions": "修改建议：在感受之后，逐条给出具体、可执行的重写建议，最好带示例改写。使用 Markdown 格式。"
}

要求：
- firstImpressionScore 必须是 1-10 的整数。
- 先有感受（readingFeeling），再给建议（revisionSuggestions）。
- readingFeeling 和 revisionSuggestions 使用中文，支持 Markdown（列表、加粗、引用等）。
- 反馈要具体、可操作，避免空泛。"#;

const CUSTOM_READER_HINT: &str = "【该读者身份由用户自定义】请根据其名称与描述推断该读者的立场、关注点与阅读偏好，并完全代入该视角给出反馈。\n\n";

/// Gateway over the configured LLM providers
///
/// Stateless apart from the read-only configuration; safe to share across
/// concurrent requests.
pub struct LlmGateway {
    config: LlmConfig,
}

impl LlmGateway {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    /// Select and construct the provider for one call
    fn provider(&self) -> Result<Box<dyn ChatCompletion>, GatewayError> {
        let preference = self
            .config
            .provider_preference
            .as_deref()
            .and_then(ProviderKind::parse);

        let choice =
            select_provider(preference, &self.config).ok_or_else(GatewayError::unconfigured)?;

        debug!("Selected LLM provider: {}", choice.provider.name());
        Ok(create_provider(choice, &self.config))
    }

    /// Analyze document structure and suggest reader personas.
    ///
    /// Caller must reject empty-after-trim text before calling.
    pub async fn analyze_document(&self, text: &str) -> Result<AnalyzeResult, GatewayError> {
        let provider = self.provider()?;
        analyze_with(provider.as_ref(), text).await
    }

    /// Role-play one reader persona and return its structured critique.
    ///
    /// Re-selecting a persona triggers a fresh call; results are never
    /// cached across calls.
    pub async fn reader_feedback(
        &self,
        text: &str,
        reader_name: &str,
        reader_description: &str,
        is_custom: bool,
    ) -> Result<ReaderFeedbackPayload, GatewayError> {
        let provider = self.provider()?;
        feedback_with(provider.as_ref(), text, reader_name, reader_description, is_custom).await
    }
}

/// Run the analysis operation against an already-constructed provider
pub async fn analyze_with(
    provider: &dyn ChatCompletion,
    text: &str,
) -> Result<AnalyzeResult, GatewayError> {
    let request = CompletionRequest {
        system: ANALYSIS_PROMPT.to_string(),
        user: format!("文档内容：\n\n{}", truncate_text(text)),
        max_tokens: ANALYSIS_MAX_TOKENS,
    };

    let raw = run_completion(provider, &request).await?;
    parse::parse_analysis(&raw)
}

/// Run the reader-feedback operation against an already-constructed provider
pub async fn feedback_with(
    provider: &dyn ChatCompletion,
    text: &str,
    reader_name: &str,
    reader_description: &str,
    is_custom: bool,
) -> Result<ReaderFeedbackPayload, GatewayError> {
    // Custom personas have no analysis-derived context; tell the model to
    // infer stance and preferences from the name and description alone.
    let custom_hint = if is_custom { CUSTOM_READER_HINT } else { "" };
    let user = format!(
        "{}请以「{}」的身份审阅以下文档。该读者的特点：{}\n\n---\n\n文档内容：\n\n{}",
        custom_hint,
        reader_name,
        reader_description,
        truncate_text(text)
    );

    let request = CompletionRequest {
        system: READER_FEEDBACK_PROMPT.to_string(),
        user,
        max_tokens: FEEDBACK_MAX_TOKENS,
    };

    let raw = run_completion(provider, &request).await?;
    parse::parse_feedback(&raw)
}

/// Invoke the provider once, classifying failures and empty output
async fn run_completion(
    provider: &dyn ChatCompletion,
    request: &CompletionRequest,
) -> Result<String, GatewayError> {
    let raw = provider.complete(request).await.map_err(|err| {
        warn!("{} provider call failed: {}", provider.kind().name(), err);
        classify(err)
    })?;

    let raw = raw.trim().to_string();
    if raw.is_empty() {
        return Err(GatewayError::EmptyModelOutput(format!(
            "{} 返回为空",
            provider.kind().name()
        )));
    }

    debug!(
        "{} completion received ({} chars)",
        provider.kind().name(),
        raw.len()
    );
    Ok(raw)
}

/// Cap document text before the prompt is built. Counts chars, never splits
/// a scalar value, and appends the truncation marker only when text was cut.
fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((byte_offset, _)) => {
            let mut truncated = text[..byte_offset].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_string(),
    }
}
