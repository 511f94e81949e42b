//! Pulse Telemetry
//!
//! Unified observability for pulse services: structured tracing and
//! lightweight in-process metrics primitives.

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::Counter;
pub use tracing_setup::init_tracing;

/// Initialize all telemetry for a service
pub fn init(service_name: &str) -> Result<(), TelemetryError> {
    let config = TelemetryConfig::from_env();
    init_tracing(service_name, &config)
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}
