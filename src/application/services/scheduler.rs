use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{JobStore, Notification, NotificationSeverity, Notifier};
use crate::application::services::analysis_pipeline::AnalysisPipeline;
use crate::application::services::sanitizer::sanitize_error;
use crate::domain::{Job, JobStatus};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub max_concurrent_jobs: usize,
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Polls the job store and drives claimed jobs to a terminal state or back
/// to the queue. In-flight jobs are bounded by a semaphore; a finished job
/// nudges the poll loop so free slots refill without waiting out the poll
/// interval.
pub struct Scheduler {
    job_store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    pipeline: Arc<AnalysisPipeline>,
    config: SchedulerConfig,
    slots: Arc<Semaphore>,
    wake: Arc<Notify>,
}

impl Scheduler {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        notifier: Arc<dyn Notifier>,
        pipeline: Arc<AnalysisPipeline>,
        config: SchedulerConfig,
    ) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            job_store,
            notifier,
            pipeline,
            config,
            slots,
            wake: Arc::new(Notify::new()),
        }
    }

    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        tracing::info!(
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Scheduler started"
        );

        loop {
            self.fill_slots(&shutdown).await;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        tracing::info!("Scheduler stopped");
    }

    /// Claims jobs until either no slot or no queued job remains.
    async fn fill_slots(self: &Arc<Self>, shutdown: &CancellationToken) {
        while let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() {
            let job = match self.job_store.claim_next().await {
                Ok(Some(job)) => job,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to claim next job");
                    break;
                }
            };

            let scheduler = Arc::clone(self);
            let cancel = shutdown.child_token();
            tokio::spawn(async move {
                let _permit = permit;
                scheduler.execute(job, cancel).await;
                scheduler.wake.notify_one();
            });
        }
    }

    async fn execute(&self, job: Job, cancel: CancellationToken) {
        let attempt = job.attempts + 1;
        let span = tracing::info_span!(
            "analysis_job",
            job_id = %job.id.as_uuid(),
            subject_id = %job.subject_id.as_uuid(),
            attempt,
        );

        async {
            if let Err(e) = self.job_store.increment_attempts(job.id).await {
                tracing::error!(error = %e, "Failed to record attempt");
            }

            match self.pipeline.process(&job, &cancel).await {
                Ok(_) => {
                    tracing::info!("Analysis completed");
                    self.finish(&job, JobStatus::Completed, None).await;
                }
                Err(err) => {
                    let requeue =
                        err.retryable() && !err.is_cancelled() && attempt < job.max_attempts;

                    if requeue {
                        tracing::warn!(
                            error = %err,
                            attempt,
                            max_attempts = job.max_attempts,
                            "Analysis failed, re-queueing"
                        );
                        if let Err(e) = self
                            .job_store
                            .transition(job.id, JobStatus::Queued, None)
                            .await
                        {
                            tracing::error!(error = %e, "Failed to re-queue job");
                        }
                    } else {
                        tracing::error!(error = %err, attempt, "Analysis failed permanently");
                        let sanitized = sanitize_error(&err.to_string());
                        self.finish(&job, JobStatus::Failed, Some(&sanitized)).await;
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn finish(&self, job: &Job, status: JobStatus, error: Option<&str>) {
        if let Err(e) = self.job_store.transition(job.id, status, error).await {
            tracing::error!(error = %e, status = %status, "Failed to record terminal status");
        }

        let notification = match status {
            JobStatus::Completed => Notification {
                owner_id: job.owner_id,
                title: "Analysis complete".to_string(),
                message: "Your credit report analysis is ready.".to_string(),
                severity: NotificationSeverity::Info,
            },
            _ => Notification {
                owner_id: job.owner_id,
                title: "Analysis failed".to_string(),
                message: error
                    .unwrap_or("The analysis could not be completed.")
                    .to_string(),
                severity: NotificationSeverity::Error,
            },
        };

        // Fire-and-forget: delivery problems never touch the job record.
        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(error = %e, "Failed to deliver notification");
        }
    }
}
