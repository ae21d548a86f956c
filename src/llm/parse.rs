//! Tolerant parsing of model output
//!
//! Models wrap JSON in prose or code fences often enough that a strict parse
//! alone is not viable. Extraction is two-stage: strict parse first, then one
//! bounded re-attempt on the substring from the first `{` to the last `}`.
//! Field normalization is forgiving: an incomplete but structurally valid
//! JSON object never fails, only input with no locatable object does.

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::reader::{AnalyzeResult, DocumentAnalysis, ReaderFeedbackPayload, SuggestedReader};

/// Analysis suggests at most this many reader personas
const MAX_SUGGESTED_READERS: usize = 3;

/// Score used when the model omits or mangles firstImpressionScore
const DEFAULT_SCORE: u8 = 5;

/// Locate and parse one JSON object inside raw model output
fn extract_json(raw: &str, context: &str) -> Result<Value, GatewayError> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Ok(value);
        }
    }

    // Re-attempt on the outermost brace-delimited substring; tolerates
    // prose wrappers and markdown code fences.
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                if value.is_object() {
                    return Ok(value);
                }
            }
        }
    }

    debug!("No JSON object located in {} output ({} chars)", context, raw.len());
    Err(GatewayError::MalformedModelOutput(format!(
        "{}返回的不是有效 JSON",
        context
    )))
}

/// Parse and normalize an analysis completion.
///
/// Extras beyond three suggested readers are discarded; fewer than three are
/// accepted as-is. Every reader gets a fresh unique id and `is_custom=false`
/// no matter what the model supplied.
pub fn parse_analysis(raw: &str) -> Result<AnalyzeResult, GatewayError> {
    let data = extract_json(raw, "LLM")?;

    let suggested_readers = data
        .get("suggestedReaders")
        .and_then(Value::as_array)
        .map(|readers| {
            readers
                .iter()
                .take(MAX_SUGGESTED_READERS)
                .enumerate()
                .map(|(i, reader)| SuggestedReader {
                    id: format!("suggested-{}-{}", i, Uuid::new_v4()),
                    name: string_field(reader, "name")
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| format!("读者 {}", i + 1)),
                    description: string_field(reader, "description").unwrap_or_default(),
                    is_custom: false,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(AnalyzeResult {
        analysis: DocumentAnalysis {
            theme: string_field(&data, "theme").unwrap_or_default(),
            tone: string_field(&data, "tone").unwrap_or_default(),
            target_audience: string_field(&data, "targetAudience").unwrap_or_default(),
        },
        suggested_readers,
    })
}

/// Parse and normalize a reader-feedback completion.
///
/// The score is coerced to the nearest integer and clamped to 1..=10, with 5
/// as the default for absent or non-numeric values. `readingFeeling` falls
/// back to the legacy `painPoints` field, then to empty, so the caller never
/// sees an absent feelings field.
pub fn parse_feedback(raw: &str) -> Result<ReaderFeedbackPayload, GatewayError> {
    let data = extract_json(raw, "读者反馈")?;

    let first_impression_score = data
        .get("firstImpressionScore")
        .and_then(Value::as_f64)
        .map(|score| score.round().clamp(1.0, 10.0) as u8)
        .unwrap_or(DEFAULT_SCORE);

    let pain_points = string_field(&data, "painPoints");

    let reading_feeling = string_field(&data, "readingFeeling")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            pain_points
                .as_deref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_default();

    Ok(ReaderFeedbackPayload {
        first_impression_score,
        first_impression_reason: string_field(&data, "firstImpressionReason").unwrap_or_default(),
        reading_feeling,
        pain_points,
        revision_suggestions: string_field(&data, "revisionSuggestions").unwrap_or_default(),
    })
}

/// Read a string field; non-string values count as absent
fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_strict_json() {
        let raw = r#"{"theme":"创业计划","tone":"正式","targetAudience":"投资人","suggestedReaders":[{"name":"挑剔的投资人","description":"看数字"},{"name":"领域专家","description":"看深度"},{"name":"普通读者","description":"看易读性"}]}"#;
        let result = parse_analysis(raw).unwrap();

        assert_eq!(result.analysis.theme, "创业计划");
        assert_eq!(result.analysis.tone, "正式");
        assert_eq!(result.analysis.target_audience, "投资人");
        assert_eq!(result.suggested_readers.len(), 3);
        assert_eq!(result.suggested_readers[0].name, "挑剔的投资人");
        assert!(!result.suggested_readers[0].is_custom);
    }

    #[test]
    fn test_analysis_code_fenced_single_reader_not_padded() {
        let raw = "Sure! ```json\n{\"theme\":\"T\",\"tone\":\"\",\"targetAudience\":\"\",\"suggestedReaders\":[{\"name\":\"A\",\"description\":\"d\"}]}\n```";
        let result = parse_analysis(raw).unwrap();

        assert_eq!(result.analysis.theme, "T");
        assert_eq!(result.analysis.tone, "");
        assert_eq!(result.analysis.target_audience, "");
        assert_eq!(result.suggested_readers.len(), 1);
        let reader = &result.suggested_readers[0];
        assert_eq!(reader.name, "A");
        assert_eq!(reader.description, "d");
        assert!(!reader.is_custom);
        assert!(!reader.id.is_empty());
    }

    #[test]
    fn test_analysis_extra_readers_discarded() {
        let raw = r#"{"suggestedReaders":[{"name":"a"},{"name":"b"},{"name":"c"},{"name":"d"},{"name":"e"}]}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.suggested_readers.len(), 3);
    }

    #[test]
    fn test_analysis_missing_name_gets_placeholder() {
        let raw = r#"{"suggestedReaders":[{"description":"d"},{"name":""}]}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.suggested_readers[0].name, "读者 1");
        assert_eq!(result.suggested_readers[1].name, "读者 2");
    }

    #[test]
    fn test_analysis_reader_ids_are_unique() {
        let raw = r#"{"suggestedReaders":[{"name":"a"},{"name":"b"},{"name":"c"}]}"#;
        let result = parse_analysis(raw).unwrap();
        let ids: Vec<_> = result.suggested_readers.iter().map(|r| &r.id).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn test_analysis_non_string_fields_default_empty() {
        let raw = r#"{"theme":42,"tone":null,"suggestedReaders":[]}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.analysis.theme, "");
        assert_eq!(result.analysis.tone, "");
        assert!(result.suggested_readers.is_empty());
    }

    #[test]
    fn test_feedback_score_clamped_and_rounded() {
        let raw = r#"{"firstImpressionScore": 13.7, "revisionSuggestions":"fix X"}"#;
        let payload = parse_feedback(raw).unwrap();

        assert_eq!(payload.first_impression_score, 10);
        assert_eq!(payload.first_impression_reason, "");
        assert_eq!(payload.reading_feeling, "");
        assert_eq!(payload.revision_suggestions, "fix X");
    }

    #[test]
    fn test_feedback_score_low_clamp_and_rounding() {
        let payload = parse_feedback(r#"{"firstImpressionScore": 0.2}"#).unwrap();
        assert_eq!(payload.first_impression_score, 1);

        let payload = parse_feedback(r#"{"firstImpressionScore": 7.5}"#).unwrap();
        assert_eq!(payload.first_impression_score, 8);
    }

    #[test]
    fn test_feedback_missing_score_defaults_to_midpoint() {
        let payload = parse_feedback(r#"{"readingFeeling":"还行"}"#).unwrap();
        assert_eq!(payload.first_impression_score, 5);

        let payload = parse_feedback(r#"{"firstImpressionScore":"nine"}"#).unwrap();
        assert_eq!(payload.first_impression_score, 5);
    }

    #[test]
    fn test_feedback_reading_feeling_falls_back_to_pain_points() {
        let raw = r#"{"firstImpressionScore":6,"painPoints":" 逻辑跳跃 "}"#;
        let payload = parse_feedback(raw).unwrap();
        assert_eq!(payload.reading_feeling, "逻辑跳跃");
        assert_eq!(payload.pain_points.as_deref(), Some(" 逻辑跳跃 "));
    }

    #[test]
    fn test_feedback_prefers_reading_feeling_over_pain_points() {
        let raw = r#"{"readingFeeling":"流畅","painPoints":"跳跃"}"#;
        let payload = parse_feedback(raw).unwrap();
        assert_eq!(payload.reading_feeling, "流畅");
    }

    #[test]
    fn test_garbage_without_braces_is_malformed() {
        let err = parse_analysis("I could not produce the analysis, sorry.").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedModelOutput(_)));

        let err = parse_feedback("no json here").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedModelOutput(_)));
    }

    #[test]
    fn test_unbalanced_braces_are_malformed() {
        let err = parse_feedback("{\"firstImpressionScore\": 7").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedModelOutput(_)));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = "这是我的分析结果：{\"theme\":\"游记\"} 希望有帮助。";
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.analysis.theme, "游记");
    }
}
