//! Scoped, TTL-aware local map from fingerprint to remote handle

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::context_cache::{compute_key, CacheScope, ScopeKey};
use crate::domain::DomainError;

/// Default margin subtracted from stored TTLs
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5);

/// Configuration for the local handle cache
#[derive(Debug, Clone)]
pub struct LocalCacheConfig {
    /// Subtracted from any TTL longer than itself so a local entry never
    /// outlives the remote resource
    pub safety_margin: Duration,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl LocalCacheConfig {
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    handle: String,
    /// `None` when `created_at + ttl` is not representable
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(handle: String, created_at: Instant, ttl: Duration) -> Self {
        Self {
            handle,
            expires_at: created_at.checked_add(ttl),
        }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    fn remaining_at(&self, now: Instant) -> Duration {
        self.expires_at
            .map_or(Duration::MAX, |expires_at| expires_at.saturating_duration_since(now))
    }
}

/// Snapshot of cache contents for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    /// Expired but not yet evicted
    pub expired_entries: usize,
    pub cache_keys: Vec<String>,
}

/// Thread-safe local cache of remote cached-content handles.
///
/// Entries are keyed by fingerprint plus isolation scope and are replace-only.
/// Every operation runs under one mutex; expired entries are evicted lazily
/// on read or in bulk by [`ScopedTtlCache::sweep_expired`].
#[derive(Debug)]
pub struct ScopedTtlCache {
    entries: Mutex<HashMap<ScopeKey, CacheEntry>>,
    config: LocalCacheConfig,
}

impl ScopedTtlCache {
    pub fn new() -> Self {
        Self::with_config(LocalCacheConfig::default())
    }

    pub fn with_config(config: LocalCacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &LocalCacheConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ScopeKey, CacheEntry>>, DomainError> {
        self.entries
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire cache lock: {}", e)))
    }

    /// TTL actually stored for a requested TTL
    pub fn adjusted_ttl(&self, ttl: Duration) -> Duration {
        if ttl > self.config.safety_margin {
            ttl - self.config.safety_margin
        } else {
            ttl
        }
    }

    /// Stores a handle, overwriting any existing entry for the same scope
    pub fn set(
        &self,
        fingerprint: &str,
        scope: &CacheScope,
        handle: impl Into<String>,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let key = compute_key(fingerprint, scope);
        let stored_ttl = self.adjusted_ttl(ttl);
        let entry = CacheEntry::new(handle.into(), Instant::now(), stored_ttl);

        let mut entries = self.lock()?;
        entries.insert(key, entry);

        Ok(())
    }

    /// Returns the handle if present and not expired; expired entries are removed
    pub fn get(&self, fingerprint: &str, scope: &CacheScope) -> Result<Option<String>, DomainError> {
        let key = compute_key(fingerprint, scope);
        let mut entries = self.lock()?;

        match entries.get(&key) {
            None => Ok(None),
            Some(entry) if !entry.is_expired_at(Instant::now()) => Ok(Some(entry.handle.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
        }
    }

    /// Remaining validity of an entry without touching it
    pub fn ttl_remaining(
        &self,
        fingerprint: &str,
        scope: &CacheScope,
    ) -> Result<Option<Duration>, DomainError> {
        let key = compute_key(fingerprint, scope);
        let entries = self.lock()?;
        let now = Instant::now();

        Ok(entries
            .get(&key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.remaining_at(now)))
    }

    /// Removes the entry for this scope; returns whether one existed
    pub fn invalidate(&self, fingerprint: &str, scope: &CacheScope) -> Result<bool, DomainError> {
        let key = compute_key(fingerprint, scope);
        Ok(self.lock()?.remove(&key).is_some())
    }

    pub fn clear(&self) -> Result<(), DomainError> {
        self.lock()?.clear();
        Ok(())
    }

    /// Removes every expired entry and returns how many were removed
    pub fn sweep_expired(&self) -> Result<usize, DomainError> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired_at(now));

        Ok(before - entries.len())
    }

    pub fn stats(&self) -> Result<CacheStats, DomainError> {
        let entries = self.lock()?;
        let now = Instant::now();

        let total_entries = entries.len();
        let expired_entries = entries.values().filter(|e| e.is_expired_at(now)).count();

        let mut cache_keys: Vec<String> = entries.keys().map(|k| k.to_string()).collect();
        cache_keys.sort();

        Ok(CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            cache_keys,
        })
    }

    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }
}

impl Default for ScopedTtlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context_cache::ProviderKind;
    use std::sync::Arc;

    const HOUR: Duration = Duration::from_secs(3600);

    fn vertex(project: &str, location: &str) -> CacheScope {
        CacheScope::vertex(project, location)
    }

    fn gemini_with(project: &str, location: &str) -> CacheScope {
        CacheScope::new(
            ProviderKind::Gemini,
            Some(project.to_string()),
            Some(location.to_string()),
        )
    }

    #[test]
    fn test_set_and_get() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("project-1", "global");

        cache.set("key1", &scope, "cache-1", HOUR).unwrap();

        assert_eq!(cache.get("key1", &scope).unwrap().as_deref(), Some("cache-1"));
    }

    #[test]
    fn test_get_missing() {
        let cache = ScopedTtlCache::new();
        assert!(cache.get("missing", &vertex("p", "l")).unwrap().is_none());
    }

    #[test]
    fn test_scoping_isolation_between_projects() {
        let cache = ScopedTtlCache::new();
        let project_1 = vertex("project-1", "global");
        let project_2 = vertex("project-2", "global");

        cache
            .set("content-hash-123", &project_1, "cache-proj1", HOUR)
            .unwrap();
        cache
            .set("content-hash-123", &project_2, "cache-proj2", HOUR)
            .unwrap();

        assert_eq!(
            cache.get("content-hash-123", &project_1).unwrap().as_deref(),
            Some("cache-proj1")
        );
        assert_eq!(
            cache.get("content-hash-123", &project_2).unwrap().as_deref(),
            Some("cache-proj2")
        );
    }

    #[test]
    fn test_scoping_isolation_between_locations() {
        let cache = ScopedTtlCache::new();
        let global = vertex("project-1", "global");
        let regional = vertex("project-1", "us-central1");

        cache.set("abc", &global, "cache-global", HOUR).unwrap();

        assert!(cache.get("abc", &regional).unwrap().is_none());

        cache.set("abc", &regional, "cache-regional", HOUR).unwrap();

        assert_eq!(cache.get("abc", &global).unwrap().as_deref(), Some("cache-global"));
        assert_eq!(
            cache.get("abc", &regional).unwrap().as_deref(),
            Some("cache-regional")
        );
    }

    #[test]
    fn test_direct_provider_ignores_namespace() {
        let cache = ScopedTtlCache::new();

        cache
            .set("abc", &gemini_with("project-1", "global"), "cachedContents/1", HOUR)
            .unwrap();

        assert_eq!(
            cache
                .get("abc", &gemini_with("project-2", "us-east1"))
                .unwrap()
                .as_deref(),
            Some("cachedContents/1")
        );
        assert_eq!(
            cache.get("abc", &CacheScope::gemini()).unwrap().as_deref(),
            Some("cachedContents/1")
        );
    }

    #[test]
    fn test_gemini_and_vertex_do_not_share_entries() {
        let cache = ScopedTtlCache::new();

        cache.set("abc", &CacheScope::gemini(), "gemini-handle", HOUR).unwrap();
        cache.set("abc", &vertex("p", "global"), "vertex-handle", HOUR).unwrap();

        assert_eq!(
            cache.get("abc", &CacheScope::gemini()).unwrap().as_deref(),
            Some("gemini-handle")
        );
        assert_eq!(
            cache.get("abc", &vertex("p", "global")).unwrap().as_deref(),
            Some("vertex-handle")
        );
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("abc", &scope, "old", HOUR).unwrap();
        cache.set("abc", &scope, "new", HOUR).unwrap();

        assert_eq!(cache.get("abc", &scope).unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_safety_margin_applied_to_long_ttls() {
        let cache = ScopedTtlCache::new();

        assert_eq!(cache.adjusted_ttl(HOUR), Duration::from_secs(3595));
        assert_eq!(cache.adjusted_ttl(Duration::from_secs(5)), Duration::from_secs(5));
        assert_eq!(cache.adjusted_ttl(Duration::from_secs(3)), Duration::from_secs(3));

        let scope = vertex("p", "l");
        cache.set("abc", &scope, "h", HOUR).unwrap();

        let remaining = cache.ttl_remaining("abc", &scope).unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(3595));
        assert!(remaining > Duration::from_secs(3590));
    }

    #[test]
    fn test_short_ttl_expires_without_margin() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("abc", &scope, "h", Duration::from_millis(50)).unwrap();
        assert_eq!(cache.get("abc", &scope).unwrap().as_deref(), Some("h"));

        std::thread::sleep(Duration::from_millis(80));

        assert!(cache.get("abc", &scope).unwrap().is_none());
        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn test_long_ttl_expires_after_margin() {
        let cache = ScopedTtlCache::with_config(
            LocalCacheConfig::default().with_safety_margin(Duration::from_millis(100)),
        );
        let scope = vertex("p", "l");

        // Stored as 50ms after the 100ms margin
        cache.set("abc", &scope, "h", Duration::from_millis(150)).unwrap();
        assert_eq!(cache.get("abc", &scope).unwrap().as_deref(), Some("h"));

        std::thread::sleep(Duration::from_millis(80));

        assert!(cache.get("abc", &scope).unwrap().is_none());
    }

    #[test]
    fn test_lazy_eviction_is_idempotent() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("short", &scope, "h1", Duration::from_millis(20)).unwrap();
        cache.set("long", &scope, "h2", HOUR).unwrap();
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.stats().unwrap().total_entries, 2);

        assert!(cache.get("short", &scope).unwrap().is_none());
        assert_eq!(cache.stats().unwrap().total_entries, 1);

        assert!(cache.get("short", &scope).unwrap().is_none());
        assert_eq!(cache.stats().unwrap().total_entries, 1);
    }

    #[test]
    fn test_stats_counts_expired_without_evicting() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("key1", &scope, "h1", HOUR).unwrap();
        cache.set("key2", &scope, "h2", Duration::from_millis(10)).unwrap();
        std::thread::sleep(Duration::from_millis(30));

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.cache_keys.len(), 2);

        // Snapshot must not have removed anything
        assert_eq!(cache.stats().unwrap(), stats);
    }

    #[test]
    fn test_invalidate_is_scoped() {
        let cache = ScopedTtlCache::new();
        let project_1 = vertex("project-1", "global");
        let project_2 = vertex("project-2", "global");

        cache.set("abc", &project_1, "h1", HOUR).unwrap();
        cache.set("abc", &project_2, "h2", HOUR).unwrap();

        assert!(cache.invalidate("abc", &project_1).unwrap());
        assert!(!cache.invalidate("abc", &project_1).unwrap());

        assert!(cache.get("abc", &project_1).unwrap().is_none());
        assert_eq!(cache.get("abc", &project_2).unwrap().as_deref(), Some("h2"));
    }

    #[test]
    fn test_clear() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("key1", &scope, "h1", HOUR).unwrap();
        cache.set("key2", &scope, "h2", HOUR).unwrap();
        cache.clear().unwrap();

        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_sweep_expired() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("key1", &scope, "h1", HOUR).unwrap();
        cache.set("key2", &scope, "h2", Duration::from_secs(7200)).unwrap();
        cache.set("key3", &scope, "h3", Duration::from_millis(10)).unwrap();
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.sweep_expired().unwrap(), 1);
        assert_eq!(cache.sweep_expired().unwrap(), 0);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.valid_entries, 2);
        assert_eq!(stats.expired_entries, 0);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = ScopedTtlCache::new();
        let scope = vertex("p", "l");

        cache.set("abc", &scope, "h", Duration::MAX).unwrap();

        assert_eq!(cache.get("abc", &scope).unwrap().as_deref(), Some("h"));
        assert_eq!(cache.stats().unwrap().expired_entries, 0);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ScopedTtlCache::new());

        std::thread::scope(|s| {
            for worker in 0..8 {
                let cache = Arc::clone(&cache);
                s.spawn(move || {
                    let scope = vertex(&format!("project-{}", worker), "global");
                    for i in 0..100 {
                        let fingerprint = format!("fp-{}", i);
                        let handle = format!("h-{}-{}", worker, i);
                        cache.set(&fingerprint, &scope, handle.clone(), HOUR).unwrap();
                        assert_eq!(cache.get(&fingerprint, &scope).unwrap(), Some(handle));
                    }
                });
            }
        });

        assert_eq!(cache.len().unwrap(), 800);
    }
}
