//! Domain types for document analysis and reader feedback

use serde::{Deserialize, Serialize};

/// Structural analysis of an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    /// One-sentence summary of the document's theme
    pub theme: String,
    /// Tone register (formal, casual, academic, ...)
    pub tone: String,
    /// Who the document is written for
    pub target_audience: String,
}

/// A reader persona, either suggested by analysis or added by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedReader {
    /// Unique, caller-visible id, stable for the session
    pub id: String,
    /// Persona name, non-empty
    pub name: String,
    /// One-sentence description of how this reader reviews documents
    #[serde(default)]
    pub description: String,
    /// True for personas the user defined rather than analysis suggested
    #[serde(default)]
    pub is_custom: bool,
}

/// Structured critique returned by a persona role-play call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderFeedbackPayload {
    /// First-impression score, always an integer in 1..=10
    pub first_impression_score: u8,
    /// One or two sentences explaining the score
    pub first_impression_reason: String,
    /// Prose reading-feeling narrative (markdown)
    pub reading_feeling: String,
    /// Legacy field some models still emit; kept for the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_points: Option<String>,
    /// Concrete, actionable revision suggestions (markdown)
    pub revision_suggestions: String,
}

/// Feedback payload tagged with the persona that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderFeedback {
    pub reader_id: String,
    pub reader_name: String,
    #[serde(flatten)]
    pub payload: ReaderFeedbackPayload,
}

/// Result of analyzing a document: structure plus suggested personas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub analysis: DocumentAnalysis,
    pub suggested_readers: Vec<SuggestedReader>,
}
