use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    AcquireError, DocumentStore, DocumentStoreError, GatewayError, GatewayErrorKind, JobStore,
    JobStoreError, ModelGateway, RateLimiter, ResultStore, ResultStoreError,
};
use crate::application::services::document_splitter::split_document;
use crate::application::services::prompts::{self, PromptSettings};
use crate::application::services::result_validator::{self, ValidationError};
use crate::domain::{AnalysisResult, Chunk, Job, JobStatus};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_chunk_chars: usize,
    pub prompts: PromptSettings,
}

/// Drives one claimed job through fetch, chunk, analyze, merge, validate and
/// persist. Chunk calls are issued strictly in index order, sequentially, so
/// the shared rate budget and call ordering stay predictable.
pub struct AnalysisPipeline {
    job_store: Arc<dyn JobStore>,
    document_store: Arc<dyn DocumentStore>,
    result_store: Arc<dyn ResultStore>,
    gateway: Arc<dyn ModelGateway>,
    rate_limiter: Arc<dyn RateLimiter>,
    config: PipelineConfig,
}

impl AnalysisPipeline {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        document_store: Arc<dyn DocumentStore>,
        result_store: Arc<dyn ResultStore>,
        gateway: Arc<dyn ModelGateway>,
        rate_limiter: Arc<dyn RateLimiter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            job_store,
            document_store,
            result_store,
            gateway,
            rate_limiter,
            config,
        }
    }

    pub async fn process(
        &self,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, PipelineError> {
        let text = self.document_store.fetch(job.subject_id).await?;

        let chunks = if text.chars().count() > self.config.max_chunk_chars {
            self.transition(job, JobStatus::Chunking).await?;
            let chunks = split_document(&text, self.config.max_chunk_chars);
            tracing::debug!(chunk_count = chunks.len(), "Document split into chunks");
            chunks
        } else {
            vec![Chunk::new(0, text)]
        };

        self.transition(job, JobStatus::Analyzing).await?;
        let partials = self.analyze_chunks(&chunks, cancel).await?;
        let merged = self.merge_partials(job, partials, cancel).await?;

        let result = result_validator::parse_and_validate(&merged)?;
        self.result_store.persist(job.subject_id, &result).await?;

        Ok(result)
    }

    async fn analyze_chunks(
        &self,
        chunks: &[Chunk],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PipelineError> {
        let mut partials = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            self.rate_limiter.acquire(1, cancel).await?;
            let request = prompts::analysis_request(&self.config.prompts, chunk, chunks.len());
            let partial = self.gateway.complete(request, cancel).await?;
            partials.push(partial);
        }

        Ok(partials)
    }

    /// A single partial is the result; multiple partials cost one more
    /// gateway call under the same rate and retry policy.
    async fn merge_partials(
        &self,
        job: &Job,
        mut partials: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<String, PipelineError> {
        if partials.len() <= 1 {
            return Ok(partials.pop().unwrap_or_default());
        }

        self.transition(job, JobStatus::Merging).await?;
        self.rate_limiter.acquire(1, cancel).await?;
        let request = prompts::merge_request(&self.config.prompts, &partials);
        let merged = self.gateway.complete(request, cancel).await?;

        Ok(merged)
    }

    async fn transition(&self, job: &Job, status: JobStatus) -> Result<(), PipelineError> {
        tracing::debug!(status = %status, "Job status transition");
        self.job_store.transition(job.id, status, None).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("document store: {0}")]
    Document(#[from] DocumentStoreError),
    #[error("model gateway: {0}")]
    Gateway(#[from] GatewayError),
    #[error("rate limiter: {0}")]
    RateLimit(#[from] AcquireError),
    #[error("result validation: {0}")]
    Validation(#[from] ValidationError),
    #[error("result store: {0}")]
    ResultStore(#[from] ResultStoreError),
    #[error("job store: {0}")]
    JobStore(#[from] JobStoreError),
}

impl PipelineError {
    /// Cancellation is terminal regardless of the remaining attempt budget.
    pub fn is_cancelled(&self) -> bool {
        match self {
            PipelineError::RateLimit(AcquireError::Cancelled) => true,
            PipelineError::Gateway(e) => e.kind == GatewayErrorKind::Cancelled,
            _ => false,
        }
    }

    /// Whether the job may be re-queued for another attempt. Validation
    /// failures are retryable: a fresh completion may yield well-formed
    /// output. A missing document never will.
    pub fn retryable(&self) -> bool {
        match self {
            PipelineError::Gateway(e) => e.retryable(),
            PipelineError::RateLimit(AcquireError::Cancelled) => false,
            PipelineError::Validation(_) => true,
            PipelineError::Document(DocumentStoreError::NotFound(_)) => false,
            PipelineError::Document(DocumentStoreError::FetchFailed(_)) => true,
            PipelineError::ResultStore(_) => true,
            PipelineError::JobStore(_) => true,
        }
    }
}
