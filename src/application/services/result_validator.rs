use serde_json::Value;

use crate::domain::{AnalysisResult, FlaggedItem, score_in_range};

/// Parses model output into the analysis schema and enforces its structural
/// invariants. Missing sections are filled with empty defaults; an
/// out-of-range credit score is coerced to null so a hallucinated number is
/// never surfaced. Only an unparsable or non-object response fails, and that
/// failure is retryable at the job level.
pub fn parse_and_validate(text: &str) -> Result<AnalysisResult, ValidationError> {
    let stripped = strip_code_fence(text);

    let value: Value = serde_json::from_str(stripped)
        .map_err(|e| ValidationError::Unparsable(e.to_string()))?;

    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let overview = object
        .get("overview")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let credit_score = object
        .get("credit_score")
        .and_then(Value::as_i64)
        .filter(|score| score_in_range(*score));

    let flagged_items = object
        .get("flagged_items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<FlaggedItem>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let recommendations = object
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(AnalysisResult {
        overview,
        credit_score,
        flagged_items,
        recommendations,
    })
}

/// Models routinely wrap JSON in a fenced block despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_prefix("json").unwrap_or(rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("unparsable model output: {0}")]
    Unparsable(String),
    #[error("model output is not a json object")]
    NotAnObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlagSeverity;

    #[test]
    fn complete_result_parses() {
        let text = r#"{
            "overview": "Two delinquent accounts.",
            "credit_score": 642,
            "flagged_items": [
                {"category": "late_payment", "description": "30 days late on auto loan", "severity": "medium"}
            ],
            "recommendations": ["Dispute the late payment"]
        }"#;

        let result = parse_and_validate(text).unwrap();
        assert_eq!(result.overview, "Two delinquent accounts.");
        assert_eq!(result.credit_score, Some(642));
        assert_eq!(result.flagged_items.len(), 1);
        assert_eq!(result.flagged_items[0].severity, FlagSeverity::Medium);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn out_of_range_score_is_coerced_to_null_not_clamped() {
        let result = parse_and_validate(r#"{"overview": "x", "credit_score": 900}"#).unwrap();
        assert_eq!(result.credit_score, None);

        let result = parse_and_validate(r#"{"overview": "x", "credit_score": 120}"#).unwrap();
        assert_eq!(result.credit_score, None);
    }

    #[test]
    fn boundary_scores_are_kept() {
        let result = parse_and_validate(r#"{"credit_score": 300}"#).unwrap();
        assert_eq!(result.credit_score, Some(300));

        let result = parse_and_validate(r#"{"credit_score": 850}"#).unwrap();
        assert_eq!(result.credit_score, Some(850));
    }

    #[test]
    fn missing_sections_get_empty_defaults() {
        let result = parse_and_validate(r#"{"credit_score": null}"#).unwrap();
        assert_eq!(result.overview, "");
        assert_eq!(result.credit_score, None);
        assert!(result.flagged_items.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn malformed_flagged_items_are_dropped_individually() {
        let text = r#"{
            "flagged_items": [
                {"category": "collections", "description": "Account in collections", "severity": "high"},
                {"category": "bad", "severity": "catastrophic"}
            ]
        }"#;

        let result = parse_and_validate(text).unwrap();
        assert_eq!(result.flagged_items.len(), 1);
        assert_eq!(result.flagged_items[0].category, "collections");
    }

    #[test]
    fn fenced_json_is_accepted() {
        let text = "```json\n{\"overview\": \"ok\"}\n```";
        let result = parse_and_validate(text).unwrap();
        assert_eq!(result.overview, "ok");
    }

    #[test]
    fn garbage_is_unparsable() {
        let err = parse_and_validate("I could not analyze this document.").unwrap_err();
        assert!(matches!(err, ValidationError::Unparsable(_)));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = parse_and_validate("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ValidationError::NotAnObject));
    }
}
