use crate::application::ports::{CallMetric, TelemetrySink};

/// Default telemetry sink: one structured log record per model call.
/// Emission is synchronous bookkeeping only and can neither block nor fail
/// the calling gateway.
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn record(&self, metric: CallMetric) {
        tracing::info!(
            request_id = %metric.request_id,
            model = %metric.model,
            success = metric.success,
            latency_ms = metric.latency_ms,
            error_type = metric.error_type.map(|k| k.as_str()),
            retry_count = metric.retry_count,
            "Model call"
        );
    }
}
