use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::{
    DocumentStore, DocumentStoreError, JobStore, JobStoreError, ResultStore, ResultStoreError,
};
use crate::domain::{AnalysisResult, Job, JobId, JobStatus, OwnerId, SubjectId};

/// In-memory job store for tests and database-less runs. Claiming happens
/// under the map mutex, which gives the same no-double-claim guarantee the
/// Postgres adapter gets from row locking.
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn enqueue(
        &self,
        subject_id: SubjectId,
        owner_id: OwnerId,
        priority: i32,
        max_attempts: i32,
    ) -> Result<JobId, JobStoreError> {
        let job = Job::new(subject_id, owner_id, priority, max_attempts);
        let id = job.id;
        self.jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, job);
        Ok(id)
    }

    async fn claim_next(&self) -> Result<Option<Job>, JobStoreError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());

        let next_id = jobs
            .values()
            .filter(|job| job.status == JobStatus::Queued)
            .min_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(a.created_at.cmp(&b.created_at))
            })
            .map(|job| job.id);

        let Some(id) = next_id else {
            return Ok(None);
        };

        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| JobStoreError::NotFound(id.as_uuid().to_string()))?;
        job.status = JobStatus::Processing;
        job.started_at = Some(Utc::now());

        Ok(Some(job.clone()))
    }

    async fn transition(
        &self,
        id: JobId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| JobStoreError::NotFound(id.as_uuid().to_string()))?;

        if job.status.is_terminal() {
            return Err(JobStoreError::TerminalState(id.as_uuid().to_string()));
        }

        job.status = status;
        if let Some(error) = error {
            job.last_error = Some(error.to_string());
        }
        if status.is_terminal() {
            job.completed_at = Some(Utc::now());
        }

        Ok(())
    }

    async fn increment_attempts(&self, id: JobId) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| JobStoreError::NotFound(id.as_uuid().to_string()))?;
        job.attempts += 1;
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(jobs.get(&id).cloned())
    }
}

pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<SubjectId, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, subject_id: SubjectId, content: impl Into<String>) {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(subject_id, content.into());
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch(&self, subject_id: SubjectId) -> Result<String, DocumentStoreError> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&subject_id)
            .cloned()
            .ok_or_else(|| DocumentStoreError::NotFound(subject_id.as_uuid().to_string()))
    }
}

pub struct MemoryResultStore {
    results: Mutex<HashMap<SubjectId, AnalysisResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, subject_id: SubjectId) -> Option<AnalysisResult> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&subject_id)
            .cloned()
    }
}

impl Default for MemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn persist(
        &self,
        subject_id: SubjectId,
        result: &AnalysisResult,
    ) -> Result<(), ResultStoreError> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(subject_id, result.clone());
        Ok(())
    }
}
