use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{JobStore, JobStoreError};
use crate::domain::{Job, JobId, JobStatus, OwnerId, SubjectId};

const JOB_COLUMNS: &str = "id, subject_id, owner_id, status, priority, attempts, max_attempts, \
                           created_at, started_at, completed_at, error";

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_failed(e: sqlx::Error) -> JobStoreError {
    JobStoreError::QueryFailed(e.to_string())
}

fn row_to_job(row: &PgRow) -> Result<Job, JobStoreError> {
    let status: String = row.try_get("status").map_err(query_failed)?;
    let status = status.parse::<JobStatus>().map_err(JobStoreError::QueryFailed)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get("id").map_err(query_failed)?),
        subject_id: SubjectId::from_uuid(row.try_get("subject_id").map_err(query_failed)?),
        owner_id: OwnerId::from_uuid(row.try_get("owner_id").map_err(query_failed)?),
        status,
        priority: row.try_get("priority").map_err(query_failed)?,
        attempts: row.try_get("attempts").map_err(query_failed)?,
        max_attempts: row.try_get("max_attempts").map_err(query_failed)?,
        created_at: row.try_get("created_at").map_err(query_failed)?,
        started_at: row.try_get("started_at").map_err(query_failed)?,
        completed_at: row.try_get("completed_at").map_err(query_failed)?,
        last_error: row.try_get("error").map_err(query_failed)?,
    })
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self))]
    async fn enqueue(
        &self,
        subject_id: SubjectId,
        owner_id: OwnerId,
        priority: i32,
        max_attempts: i32,
    ) -> Result<JobId, JobStoreError> {
        let job = Job::new(subject_id, owner_id, priority, max_attempts);

        sqlx::query(
            r#"
            INSERT INTO jobs (id, subject_id, owner_id, status, priority, attempts, max_attempts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.subject_id.as_uuid())
        .bind(job.owner_id.as_uuid())
        .bind(job.status.as_str())
        .bind(job.priority)
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(job.id)
    }

    /// Row-locked claim: `FOR UPDATE SKIP LOCKED` guarantees two concurrent
    /// workers never receive the same job.
    #[instrument(skip(self))]
    async fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE jobs SET status = $1, started_at = $2
            WHERE id = (
                SELECT id FROM jobs
                WHERE status = $3
                ORDER BY priority DESC, created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(JobStatus::Processing.as_str())
        .bind(Utc::now())
        .bind(JobStatus::Queued.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self, error), fields(job_id = %id.as_uuid(), status = %status))]
    async fn transition(
        &self,
        id: JobId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), JobStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2,
                error = COALESCE($3, error),
                completed_at = CASE WHEN $4 THEN $5 ELSE completed_at END
            WHERE id = $1 AND status NOT IN ('COMPLETED', 'FAILED')
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(error)
        .bind(status.is_terminal())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM jobs WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?;

            return Err(if exists.is_some() {
                JobStoreError::TerminalState(id.as_uuid().to_string())
            } else {
                JobStoreError::NotFound(id.as_uuid().to_string())
            });
        }

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn increment_attempts(&self, id: JobId) -> Result<(), JobStoreError> {
        let result = sqlx::query("UPDATE jobs SET attempts = attempts + 1 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::NotFound(id.as_uuid().to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.as_ref().map(row_to_job).transpose()
    }
}
