use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{OwnerId, SubjectId};
use crate::presentation::state::AppState;

use super::ErrorResponse;

#[derive(Debug, Deserialize)]
pub struct SubmitAnalysisRequest {
    pub subject_id: Uuid,
    pub owner_id: Uuid,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Serialize)]
pub struct SubmitAnalysisResponse {
    pub job_id: String,
}

#[tracing::instrument(skip(state))]
pub async fn submit_analysis_handler(
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnalysisRequest>,
) -> impl IntoResponse {
    let result = state
        .job_store
        .enqueue(
            SubjectId::from_uuid(payload.subject_id),
            OwnerId::from_uuid(payload.owner_id),
            payload.priority,
            state.default_max_attempts,
        )
        .await;

    match result {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(SubmitAnalysisResponse {
                job_id: job_id.as_uuid().to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to enqueue analysis job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to enqueue job: {}", e),
                }),
            )
                .into_response()
        }
    }
}
