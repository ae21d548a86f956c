//! API data models

use serde::{Deserialize, Serialize};

use crate::reader::{DocumentAnalysis, SuggestedReader};

/// Error body returned by every failing endpoint: a user-readable message
/// plus a machine-readable code the UI can branch on
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Response for `POST /api/analyze`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub filename: String,
    pub extracted_text: String,
    pub analysis: DocumentAnalysis,
    pub suggested_readers: Vec<SuggestedReader>,
}

/// Request body for `POST /api/feedback`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub extracted_text: String,
    pub reader: Option<SuggestedReader>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_request_deserializes() {
        let body = r#"{
            "extractedText": "正文",
            "reader": {"id": "suggested-0-x", "name": "领域专家", "description": "看深度", "isCustom": false}
        }"#;
        let request: FeedbackRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.extracted_text, "正文");
        assert_eq!(request.reader.unwrap().name, "领域专家");
    }

    #[test]
    fn test_feedback_request_tolerates_missing_fields() {
        let request: FeedbackRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.extracted_text, "");
        assert!(request.reader.is_none());
    }
}
