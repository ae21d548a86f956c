/// Reader Critic - document critique service
///
/// Extracts text from uploaded PDF/Word documents, analyzes them with an LLM
/// and role-plays suggested reader personas to produce structured critiques.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod reader;

// Re-export main types for easy access
pub use crate::config::{Config, LlmConfig, ServerConfig};
pub use crate::error::{classify, ErrorCategory, GatewayError, ProviderError};
pub use crate::ingest::{detect_kind, extract_text, DocumentKind, IngestError};
pub use crate::llm::{ChatCompletion, CompletionRequest, LlmGateway, ProviderKind};
pub use crate::reader::{
    AnalyzeResult, DocumentAnalysis, ReaderFeedback, ReaderFeedbackPayload, SuggestedReader,
};
