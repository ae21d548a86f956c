//! API request handlers
//!
//! Validation happens here, before any LLM call: input problems are reported
//! immediately and never reach the gateway. Handlers are plain functions
//! over the shared gateway so the HTTP framing stays thin.

use axum::http::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ErrorCategory, GatewayError};
use crate::ingest::{self, IngestError};
use crate::llm::LlmGateway;
use crate::reader::ReaderFeedback;

use super::models::{AnalyzeResponse, FeedbackRequest};

/// A failed request: HTTP status plus the `{error, code}` body fields
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn input(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match &err {
            IngestError::UnsupportedType => Self::input("UNSUPPORTED_TYPE", &err.to_string()),
            IngestError::ParseFailed(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "PARSE_FAILED".to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match err.category() {
            ErrorCategory::Unconfigured => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::RateLimitOrQuota => StatusCode::TOO_MANY_REQUESTS,
            ErrorCategory::InvalidCredential => StatusCode::UNAUTHORIZED,
            ErrorCategory::GenericProviderFailure
            | ErrorCategory::EmptyModelOutput
            | ErrorCategory::MalformedModelOutput => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            code: err.category().code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Handle health check requests
pub async fn health_check() -> Value {
    serde_json::json!({
        "status": "healthy",
        "service": "reader-critic",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Handle an uploaded document: extract text, validate, analyze.
///
/// `file` is None when the multipart body had no usable file field.
pub async fn run_analysis(
    gateway: &LlmGateway,
    file: Option<(Vec<u8>, String, String)>,
) -> Result<AnalyzeResponse, ApiError> {
    let (bytes, mime, filename) =
        file.ok_or_else(|| ApiError::input("MISSING_FILE", "请上传文件"))?;

    if bytes.is_empty() {
        return Err(ApiError::input("EMPTY_FILE", "上传文件为空"));
    }

    let text = ingest::extract_text(&bytes, &mime, &filename)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::input(
            "NO_TEXT_EXTRACTED",
            "未能从文档中提取到文本，请确认文件内容有效且非扫描版图片",
        ));
    }

    debug!(
        "Extracted {} chars from '{}', requesting analysis",
        trimmed.chars().count(),
        filename
    );

    let result = gateway.analyze_document(trimmed).await.map_err(|e| {
        warn!("Document analysis failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(AnalyzeResponse {
        filename,
        extracted_text: trimmed.to_string(),
        analysis: result.analysis,
        suggested_readers: result.suggested_readers,
    })
}

/// Handle a reader-feedback request for previously extracted text
pub async fn run_feedback(
    gateway: &LlmGateway,
    request: FeedbackRequest,
) -> Result<ReaderFeedback, ApiError> {
    let text = request.extracted_text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::input("EMPTY_TEXT", "文档内容为空"));
    }

    let reader = request
        .reader
        .filter(|r| !r.id.is_empty() && !r.name.is_empty())
        .ok_or_else(|| ApiError::input("INVALID_READER", "请选择读者身份"))?;

    let payload = gateway
        .reader_feedback(&text, &reader.name, &reader.description, reader.is_custom)
        .await
        .map_err(|e| {
            warn!("Reader feedback failed for '{}': {}", reader.name, e);
            ApiError::from(e)
        })?;

    Ok(ReaderFeedback {
        reader_id: reader.id,
        reader_name: reader.name,
        payload,
    })
}
