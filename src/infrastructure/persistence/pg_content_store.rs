use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{
    DocumentStore, DocumentStoreError, ResultStore, ResultStoreError,
};
use crate::domain::{AnalysisResult, SubjectId};

/// Reads the extracted report text staged upstream for a subject.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self), fields(subject_id = %subject_id.as_uuid()))]
    async fn fetch(&self, subject_id: SubjectId) -> Result<String, DocumentStoreError> {
        let row = sqlx::query("SELECT content FROM subject_documents WHERE subject_id = $1")
            .bind(subject_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DocumentStoreError::FetchFailed(e.to_string()))?;

        match row {
            Some(row) => row
                .try_get("content")
                .map_err(|e| DocumentStoreError::FetchFailed(e.to_string())),
            None => Err(DocumentStoreError::NotFound(
                subject_id.as_uuid().to_string(),
            )),
        }
    }
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    #[instrument(skip(self, result), fields(subject_id = %subject_id.as_uuid()))]
    async fn persist(
        &self,
        subject_id: SubjectId,
        result: &AnalysisResult,
    ) -> Result<(), ResultStoreError> {
        let payload = serde_json::to_string(result)
            .map_err(|e| ResultStoreError::PersistFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO analysis_results (subject_id, result, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (subject_id)
            DO UPDATE SET result = EXCLUDED.result, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(subject_id.as_uuid())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| ResultStoreError::PersistFailed(e.to_string()))?;

        Ok(())
    }
}
