use serde::{Deserialize, Serialize};

/// Valid range for a reported credit score. Values outside this range are
/// coerced to `None` during validation, never clamped.
pub const SCORE_MIN: i64 = 300;
pub const SCORE_MAX: i64 = 850;

/// Structured output of one completed analysis. Every section key is present
/// after validation, even when its value is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overview: String,
    pub credit_score: Option<i64>,
    pub flagged_items: Vec<FlaggedItem>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedItem {
    pub category: String,
    pub description: String,
    pub severity: FlagSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

pub fn score_in_range(score: i64) -> bool {
    (SCORE_MIN..=SCORE_MAX).contains(&score)
}
