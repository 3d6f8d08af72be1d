//! Observability infrastructure - Tracing, Metrics, and Logging

mod config;
mod metrics;
mod observer;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{record_local_cache, record_remote_call, record_resolve};
pub use observer::TelemetryObserver;
pub use tracing_setup::{init_tracing, shutdown_tracing};
