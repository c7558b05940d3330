use std::time::Duration;

use credana::application::ports::{JobStore, JobStoreError};
use credana::domain::{JobStatus, OwnerId, SubjectId};
use credana::infrastructure::persistence::MemoryJobStore;

async fn enqueue_spaced(
    store: &MemoryJobStore,
    priority: i32,
) -> credana::domain::JobId {
    let id = store
        .enqueue(SubjectId::new(), OwnerId::new(), priority, 3)
        .await
        .expect("enqueue");
    // Spread created_at so FIFO ordering within a priority is observable.
    tokio::time::sleep(Duration::from_millis(2)).await;
    id
}

#[tokio::test]
async fn given_mixed_priorities_when_claiming_then_priority_desc_then_fifo() {
    let store = MemoryJobStore::new();

    let c = enqueue_spaced(&store, 5).await;
    let a = enqueue_spaced(&store, 5).await;
    let b = enqueue_spaced(&store, 10).await;

    let first = store.claim_next().await.expect("claim").expect("job");
    let second = store.claim_next().await.expect("claim").expect("job");
    let third = store.claim_next().await.expect("claim").expect("job");

    assert_eq!(first.id, b, "highest priority wins");
    assert_eq!(second.id, c, "oldest within equal priority wins");
    assert_eq!(third.id, a);
    assert!(store.claim_next().await.expect("claim").is_none());
}

#[tokio::test]
async fn given_claimed_job_when_inspected_then_processing_with_started_at() {
    let store = MemoryJobStore::new();
    let id = store
        .enqueue(SubjectId::new(), OwnerId::new(), 0, 3)
        .await
        .expect("enqueue");

    let claimed = store.claim_next().await.expect("claim").expect("job");

    assert_eq!(claimed.id, id);
    assert_eq!(claimed.status, JobStatus::Processing);
    assert!(claimed.started_at.is_some());
}

#[tokio::test]
async fn given_terminal_job_when_transitioning_then_rejected() {
    let store = MemoryJobStore::new();
    let id = store
        .enqueue(SubjectId::new(), OwnerId::new(), 0, 3)
        .await
        .expect("enqueue");

    store
        .transition(id, JobStatus::Completed, None)
        .await
        .expect("transition to completed");

    let result = store.transition(id, JobStatus::Queued, None).await;
    assert!(matches!(result, Err(JobStoreError::TerminalState(_))));

    let job = store.get_by_id(id).await.expect("get").expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn given_recorded_error_when_requeued_then_last_error_is_preserved() {
    let store = MemoryJobStore::new();
    let id = store
        .enqueue(SubjectId::new(), OwnerId::new(), 0, 3)
        .await
        .expect("enqueue");

    store.claim_next().await.expect("claim").expect("job");
    store
        .transition(id, JobStatus::Analyzing, Some("upstream 503"))
        .await
        .expect("transition");
    store
        .transition(id, JobStatus::Queued, None)
        .await
        .expect("requeue");

    let job = store.get_by_id(id).await.expect("get").expect("job");
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.last_error.as_deref(), Some("upstream 503"));
}

#[tokio::test]
async fn given_attempt_increments_when_read_then_counter_matches() {
    let store = MemoryJobStore::new();
    let id = store
        .enqueue(SubjectId::new(), OwnerId::new(), 0, 3)
        .await
        .expect("enqueue");

    store.increment_attempts(id).await.expect("increment");
    store.increment_attempts(id).await.expect("increment");

    let job = store.get_by_id(id).await.expect("get").expect("job");
    assert_eq!(job.attempts, 2);
}
