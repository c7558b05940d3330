use async_trait::async_trait;

use crate::domain::OwnerId;

/// Outbound user notification on job completion or failure. Fire-and-forget:
/// a notifier failure never rolls back the job's terminal state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifierError>;
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub owner_id: OwnerId,
    pub title: String,
    pub message: String,
    pub severity: NotificationSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSeverity {
    Info,
    Error,
}

impl NotificationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationSeverity::Info => "info",
            NotificationSeverity::Error => "error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}
