use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{
    CallMetric, CompletionRequest, GatewayError, GatewayErrorKind, ModelGateway, TelemetrySink,
};
use crate::infrastructure::llm::classify::{classify_http_status, classify_message};

/// Adapter for an OpenAI-style chat completions endpoint. One request per
/// call, a hard timeout independent of caller cancellation, classified
/// failures, no internal retries.
pub struct OpenAiGateway {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    telemetry: Arc<dyn TelemetrySink>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiGateway {
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            telemetry,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    GatewayErrorKind::Timeout
                } else if e.is_connect() {
                    GatewayErrorKind::ConnectionError
                } else {
                    classify_message(&e.to_string())
                };
                GatewayError::new(kind, e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            let kind = classify_http_status(status, &body_text);
            return Err(GatewayError::new(
                kind,
                format!("HTTP {}: {}", status, body_text),
            ));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            // Malformed response body, not a malformed request: a retry may
            // yield a well-formed one.
            GatewayError::new(
                GatewayErrorKind::Unknown,
                format!("invalid response body: {}", e),
            )
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::new(GatewayErrorKind::Unknown, "empty choices"))
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(GatewayError::new(
                GatewayErrorKind::Cancelled,
                "call cancelled by caller",
            )),
            timed = tokio::time::timeout(self.timeout, self.send_request(&request)) => {
                match timed {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::new(
                        GatewayErrorKind::Timeout,
                        format!("call exceeded {}s deadline", self.timeout.as_secs()),
                    )),
                }
            }
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        self.telemetry.record(CallMetric {
            request_id,
            model: request.model.clone(),
            success: outcome.is_ok(),
            latency_ms,
            error_type: outcome.as_ref().err().map(|e| e.kind),
            retry_count: 0,
        });

        match &outcome {
            Ok(_) => tracing::debug!(model = %request.model, latency_ms, "Completion succeeded"),
            Err(e) => {
                tracing::warn!(model = %request.model, latency_ms, kind = %e.kind, "Completion failed")
            }
        }

        outcome
    }
}
