use async_trait::async_trait;

use crate::domain::{Job, JobId, JobStatus, OwnerId, SubjectId};

/// Durable record of queue items. These operations are the only way job
/// state changes; workers never mutate job fields directly.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn enqueue(
        &self,
        subject_id: SubjectId,
        owner_id: OwnerId,
        priority: i32,
        max_attempts: i32,
    ) -> Result<JobId, JobStoreError>;

    /// Atomically selects the highest-priority, oldest queued job and moves
    /// it to `Processing`, setting `started_at`. Concurrent callers never
    /// receive the same job. Ordering: priority descending, then FIFO.
    async fn claim_next(&self) -> Result<Option<Job>, JobStoreError>;

    /// Rejected with `TerminalState` when the job is already completed or
    /// failed. Terminal transitions set `completed_at`.
    async fn transition(
        &self,
        id: JobId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), JobStoreError>;

    async fn increment_attempts(&self, id: JobId) -> Result<(), JobStoreError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, JobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("job is in a terminal state: {0}")]
    TerminalState(String),
}
