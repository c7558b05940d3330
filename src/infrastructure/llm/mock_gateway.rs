use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    CompletionRequest, GatewayError, GatewayErrorKind, ModelGateway,
};

const DEFAULT_RESPONSE: &str =
    r#"{"overview": "", "credit_score": null, "flagged_items": [], "recommendations": []}"#;

/// Deterministic gateway for tests: scripted responses are consumed in
/// order, every request is recorded, and an optional per-call delay makes
/// cancellation and concurrency observable.
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(text.into()));
    }

    pub fn push_error(&self, kind: GatewayErrorKind, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(GatewayError::new(kind, message)));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(GatewayError::new(
                        GatewayErrorKind::Cancelled,
                        "call cancelled by caller",
                    ));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_RESPONSE.to_string()))
    }
}
