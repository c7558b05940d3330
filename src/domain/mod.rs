mod analysis;
mod chunk;
mod job;
mod job_status;

pub use analysis::{
    AnalysisResult, FlagSeverity, FlaggedItem, SCORE_MAX, SCORE_MIN, score_in_range,
};
pub use chunk::Chunk;
pub use job::{Job, JobId, OwnerId, SubjectId};
pub use job_status::JobStatus;
