//! Infrastructure services

mod context_cache_service;

pub use context_cache_service::{ContextCacheConfig, ContextCacheService};
