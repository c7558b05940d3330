mod init_tracing;
mod log_telemetry;
mod tracing_config;

pub use init_tracing::init_tracing;
pub use log_telemetry::LogTelemetry;
pub use tracing_config::TracingConfig;
