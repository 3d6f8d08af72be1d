//! PMP Context Cache
//!
//! Reuses remote "cached content" resources for LLM prompts:
//! - Scoped local TTL cache of remote handles (per provider, project and location)
//! - Lookup-or-create coordination against the remote cached-contents API
//! - Google AI Studio and Vertex AI clients
//! - Tracing and metrics for every resolve

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::DomainError;
use infrastructure::context_cache::{LocalCacheConfig, ScopedTtlCache};
use infrastructure::observability::TelemetryObserver;
use infrastructure::services::{ContextCacheConfig, ContextCacheService};
use infrastructure::vertex::{HttpClient, VertexCachedContentClient};

/// Build the shared local cache from configuration
pub fn create_local_cache(config: &AppConfig) -> Arc<ScopedTtlCache> {
    let local = LocalCacheConfig::default().with_safety_margin(config.cache.safety_margin());
    Arc::new(ScopedTtlCache::with_config(local))
}

/// Build the resolve coordinator around a shared cache
pub fn create_context_cache_service(
    config: &AppConfig,
    cache: Arc<ScopedTtlCache>,
) -> ContextCacheService {
    let mut service_config =
        ContextCacheConfig::default().with_default_ttl(config.cache.default_ttl());
    if !config.cache.serialize_creations {
        service_config = service_config.without_serialized_creations();
    }

    let observer = TelemetryObserver::new(&config.observability.metrics);

    ContextCacheService::with_config(cache, service_config).with_observer(Arc::new(observer))
}

/// Build the remote client for the configured provider
pub fn create_remote_client(
    config: &AppConfig,
) -> Result<VertexCachedContentClient<HttpClient>, DomainError> {
    let http = HttpClient::with_timeout(config.remote.timeout())?;
    Ok(VertexCachedContentClient::new(
        http,
        config.remote.client_config(),
    ))
}
