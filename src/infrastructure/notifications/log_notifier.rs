use async_trait::async_trait;

use crate::application::ports::{Notification, Notifier, NotifierError};

/// Default notifier: emits the notification as a structured log record.
/// Deployments with a real delivery channel swap this adapter out at wiring
/// time.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifierError> {
        tracing::info!(
            owner_id = %notification.owner_id.as_uuid(),
            title = %notification.title,
            severity = notification.severity.as_str(),
            message = %notification.message,
            "User notification"
        );
        Ok(())
    }
}
