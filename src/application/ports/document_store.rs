use async_trait::async_trait;

use crate::domain::SubjectId;

/// Read access to the extracted plain-text document for a subject. Text
/// extraction itself happens upstream; the pipeline only ever sees text.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, subject_id: SubjectId) -> Result<String, DocumentStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}
