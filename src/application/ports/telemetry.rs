use super::model_gateway::GatewayErrorKind;

/// One structured record per model gateway call. Consumers are external;
/// emission must never block or fail the caller.
#[derive(Debug, Clone)]
pub struct CallMetric {
    pub request_id: String,
    pub model: String,
    pub success: bool,
    pub latency_ms: u64,
    pub error_type: Option<GatewayErrorKind>,
    pub retry_count: i32,
}

pub trait TelemetrySink: Send + Sync {
    fn record(&self, metric: CallMetric);
}
