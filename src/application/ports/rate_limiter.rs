use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Token-based bound on outbound call rate. `acquire` suspends until the
/// requested tokens are available and consumes them atomically; a cancelled
/// wait consumes nothing.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self, n: u32, cancel: &CancellationToken) -> Result<(), AcquireError>;

    fn try_acquire(&self, n: u32) -> bool;

    fn available(&self) -> f64;
}

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("wait cancelled")]
    Cancelled,
}
