//! Resolve observer backed by tracing and metrics

use crate::domain::context_cache::{ResolveEvent, ResolveObserver, ResolveOutcome};

use super::config::MetricsConfig;
use super::metrics::record_resolve;

/// Logs every resolve and, when enabled, records metrics for it
#[derive(Debug, Clone)]
pub struct TelemetryObserver {
    metrics_enabled: bool,
}

impl TelemetryObserver {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            metrics_enabled: config.enabled,
        }
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }
}

impl Default for TelemetryObserver {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}

impl ResolveObserver for TelemetryObserver {
    fn on_resolve(&self, event: &ResolveEvent) {
        let latency_ms = event.latency.as_secs_f64() * 1000.0;
        let fingerprint = event.fingerprint.as_deref().unwrap_or("-");

        match event.outcome {
            ResolveOutcome::Failed(kind) => tracing::warn!(
                provider = %event.provider,
                fingerprint,
                error_kind = kind,
                latency_ms,
                "Context cache resolve failed"
            ),
            ResolveOutcome::Created | ResolveOutcome::RemoteHit => tracing::info!(
                provider = %event.provider,
                fingerprint,
                outcome = event.outcome.as_str(),
                latency_ms,
                "Context cache resolved remotely"
            ),
            _ => tracing::debug!(
                provider = %event.provider,
                fingerprint,
                outcome = event.outcome.as_str(),
                latency_ms,
                "Context cache resolved locally"
            ),
        }

        if self.metrics_enabled {
            record_resolve(event);
        }
    }
}
