use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AcquireError, RateLimiter};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct TokenBucketConfig {
    pub capacity: u32,
    pub refill_per_interval: u32,
    pub interval_ms: u64,
}

impl Default for TokenBucketConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_per_interval: 10,
            interval_ms: 1000,
        }
    }
}

/// Token bucket with continuous refill. The bucket state is the one piece of
/// shared mutable state in the pipeline; all access is serialized behind the
/// mutex and the lock is never held across an await point.
pub struct TokenBucket {
    capacity: f64,
    refill_per_interval: u64,
    interval_ms: u64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill_at: Instant,
}

impl TokenBucket {
    pub fn new(config: TokenBucketConfig) -> Self {
        Self {
            capacity: f64::from(config.capacity),
            refill_per_interval: u64::from(config.refill_per_interval),
            interval_ms: config.interval_ms.max(1),
            state: Mutex::new(BucketState {
                tokens: f64::from(config.capacity),
                last_refill_at: Instant::now(),
            }),
        }
    }

    /// Credits whole tokens earned since the last refill. `last_refill_at`
    /// advances only by the time those tokens account for, so partial
    /// intervals are not lost between calls.
    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(state.last_refill_at).as_millis() as u64;
        let added = elapsed_ms.saturating_mul(self.refill_per_interval) / self.interval_ms;

        if added == 0 {
            return;
        }

        state.tokens += added as f64;
        if state.tokens >= self.capacity {
            state.tokens = self.capacity;
            state.last_refill_at = now;
        } else {
            let credited_ms = added * self.interval_ms / self.refill_per_interval;
            state.last_refill_at += Duration::from_millis(credited_ms);
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self, n: u32, cancel: &CancellationToken) -> Result<(), AcquireError> {
        debug_assert!(f64::from(n) <= self.capacity, "acquire exceeds bucket capacity");

        loop {
            if self.try_acquire(n) {
                return Ok(());
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(AcquireError::Cancelled),
                _ = tokio::time::sleep(WAIT_POLL_INTERVAL) => {}
            }
        }
    }

    fn try_acquire(&self, n: u32) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut state);

        let needed = f64::from(n);
        if state.tokens >= needed {
            state.tokens -= needed;
            true
        } else {
            false
        }
    }

    fn available(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut state);
        state.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(capacity: u32, refill_per_interval: u32, interval_ms: u64) -> TokenBucket {
        TokenBucket::new(TokenBucketConfig {
            capacity,
            refill_per_interval,
            interval_ms,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn drained_bucket_waits_one_refill_step() {
        let bucket = bucket(10, 10, 1000);
        assert!(bucket.try_acquire(10));

        let start = Instant::now();
        bucket
            .acquire(1, &CancellationToken::new())
            .await
            .expect("acquire");
        let elapsed = start.elapsed();

        // One token becomes available after 1/10th of the interval.
        assert!(elapsed >= Duration::from_millis(100), "resolved at {:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(250), "resolved at {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn try_acquire_fails_without_tokens() {
        let bucket = bucket(2, 1, 60_000);
        assert!(bucket.try_acquire(2));
        assert!(!bucket.try_acquire(1));
    }

    #[tokio::test(start_paused = true)]
    async fn refill_is_capped_at_capacity() {
        let bucket = bucket(5, 5, 100);
        assert!(bucket.try_acquire(3));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(bucket.available(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_intervals_are_not_lost() {
        let bucket = bucket(10, 10, 1000);
        assert!(bucket.try_acquire(10));

        // 150ms earns one whole token; the leftover 50ms keeps accruing.
        tokio::time::advance(Duration::from_millis(150)).await;
        assert_eq!(bucket.available(), 1.0);

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(bucket.available(), 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_consumes_no_tokens() {
        let bucket = bucket(1, 1, 60_000);
        assert!(bucket.try_acquire(1));

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = bucket.acquire(1, &cancel).await;
        assert!(matches!(result, Err(AcquireError::Cancelled)));
        assert_eq!(bucket.available(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_succeeds_immediately_when_tokens_available() {
        let bucket = bucket(5, 1, 1000);
        let start = Instant::now();
        bucket
            .acquire(3, &CancellationToken::new())
            .await
            .expect("acquire");
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(bucket.available(), 2.0);
    }
}
