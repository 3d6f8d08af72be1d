//! Resolve metrics recorded through the `metrics` facade

use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::domain::context_cache::{ResolveEvent, ResolveOutcome};
use crate::infrastructure::context_cache::CacheStats;

pub const RESOLVE_TOTAL: &str = "context_cache_resolve_total";
pub const RESOLVE_DURATION: &str = "context_cache_resolve_duration_seconds";
pub const RESOLVE_ERRORS: &str = "context_cache_resolve_errors_total";
pub const LOCAL_ENTRIES: &str = "context_cache_local_entries";

/// Label set for one resolve event
fn resolve_labels(event: &ResolveEvent) -> [(&'static str, String); 2] {
    [
        ("provider", event.provider.as_str().to_string()),
        ("outcome", event.outcome.as_str().to_string()),
    ]
}

/// Record a resolve outcome and its latency
pub fn record_resolve(event: &ResolveEvent) {
    let labels = resolve_labels(event);

    counter!(RESOLVE_TOTAL, &labels).increment(1);
    histogram!(RESOLVE_DURATION, &labels).record(event.latency.as_secs_f64());

    if let ResolveOutcome::Failed(kind) = event.outcome {
        let error_labels = [
            ("provider", event.provider.as_str().to_string()),
            ("kind", kind.to_string()),
        ];
        counter!(RESOLVE_ERRORS, &error_labels).increment(1);
    }
}

/// Record the local cache size split by validity
pub fn record_local_cache(stats: &CacheStats) {
    gauge!(LOCAL_ENTRIES, "state" => "valid").set(stats.valid_entries as f64);
    gauge!(LOCAL_ENTRIES, "state" => "expired").set(stats.expired_entries as f64);
}

/// Record the duration of a remote API call
pub fn record_remote_call(provider: &str, operation: &'static str, duration: Duration, ok: bool) {
    let labels = [
        ("provider", provider.to_string()),
        ("operation", operation.to_string()),
        ("status", if ok { "success" } else { "error" }.to_string()),
    ];

    histogram!("context_cache_remote_call_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}
