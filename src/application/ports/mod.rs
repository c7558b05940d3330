mod document_store;
mod job_store;
mod model_gateway;
mod notifier;
mod rate_limiter;
mod result_store;
mod telemetry;

pub use document_store::{DocumentStore, DocumentStoreError};
pub use job_store::{JobStore, JobStoreError};
pub use model_gateway::{
    ChatMessage, CompletionRequest, GatewayError, GatewayErrorKind, ModelGateway,
};
pub use notifier::{Notification, NotificationSeverity, Notifier, NotifierError};
pub use rate_limiter::{AcquireError, RateLimiter};
pub use result_store::{ResultStore, ResultStoreError};
pub use telemetry::{CallMetric, TelemetrySink};
