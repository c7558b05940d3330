use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Single-call adapter to the external completion API. The gateway never
/// retries; retry policy lives in the scheduler so the attempt budget is
/// tracked per job, not per call.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: usize,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn retryable(&self) -> bool {
        self.kind.retryable()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Authentication,
    RateLimited,
    QuotaExceeded,
    Timeout,
    ServerError,
    ConnectionError,
    Validation,
    Cancelled,
    Unknown,
}

impl GatewayErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayErrorKind::Authentication => "authentication",
            GatewayErrorKind::RateLimited => "rate_limited",
            GatewayErrorKind::QuotaExceeded => "quota_exceeded",
            GatewayErrorKind::Timeout => "timeout",
            GatewayErrorKind::ServerError => "server_error",
            GatewayErrorKind::ConnectionError => "connection_error",
            GatewayErrorKind::Validation => "validation",
            GatewayErrorKind::Cancelled => "cancelled",
            GatewayErrorKind::Unknown => "unknown",
        }
    }

    /// Whether the scheduler may re-queue a job that failed with this kind.
    /// Unknown is retryable, conservatively. Cancellation is terminal.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorKind::RateLimited
                | GatewayErrorKind::Timeout
                | GatewayErrorKind::ServerError
                | GatewayErrorKind::ConnectionError
                | GatewayErrorKind::Unknown
        )
    }
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
