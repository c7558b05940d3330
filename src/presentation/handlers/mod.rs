mod analyses;
mod health;
mod job_status;

use serde::Serialize;

pub use analyses::{SubmitAnalysisRequest, SubmitAnalysisResponse, submit_analysis_handler};
pub use health::health_handler;
pub use job_status::{JobStatusResponse, job_status_handler};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
