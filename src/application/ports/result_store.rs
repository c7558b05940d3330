use async_trait::async_trait;

use crate::domain::{AnalysisResult, SubjectId};

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn persist(
        &self,
        subject_id: SubjectId,
        result: &AnalysisResult,
    ) -> Result<(), ResultStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResultStoreError {
    #[error("persist failed: {0}")]
    PersistFailed(String),
}
