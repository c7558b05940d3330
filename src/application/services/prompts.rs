use crate::application::ports::{ChatMessage, CompletionRequest};
use crate::domain::Chunk;

/// Model parameters shared by every request the pipeline issues.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a credit report analyst. Analyze the credit report text \
you are given and respond with a single JSON object and nothing else. The object must have exactly \
these keys: \"overview\" (string summary), \"credit_score\" (integer, or null if no score is stated), \
\"flagged_items\" (array of objects with \"category\", \"description\" and \"severity\" of \"low\", \
\"medium\" or \"high\"), and \"recommendations\" (array of strings).";

const MERGE_SYSTEM_PROMPT: &str = "You are a credit report analyst. You are given several partial \
analyses of consecutive sections of one credit report. Consolidate them into a single JSON object \
with exactly these keys: \"overview\", \"credit_score\", \"flagged_items\", \"recommendations\". \
Deduplicate overlapping findings. Respond with the JSON object and nothing else.";

pub fn analysis_request(
    settings: &PromptSettings,
    chunk: &Chunk,
    total_chunks: usize,
) -> CompletionRequest {
    let user = if total_chunks > 1 {
        format!(
            "Section {} of {} of a credit report:\n\n{}",
            chunk.index + 1,
            total_chunks,
            chunk.text
        )
    } else {
        format!("Credit report:\n\n{}", chunk.text)
    };

    CompletionRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
            ChatMessage::user(user),
        ],
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

pub fn merge_request(settings: &PromptSettings, partials: &[String]) -> CompletionRequest {
    let mut user = String::from("Partial analyses to consolidate:\n");
    for (index, partial) in partials.iter().enumerate() {
        user.push_str(&format!("\n### Partial result {}\n{}\n", index + 1, partial));
    }

    CompletionRequest {
        model: settings.model.clone(),
        messages: vec![
            ChatMessage::system(MERGE_SYSTEM_PROMPT),
            ChatMessage::user(user),
        ],
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}
