//! Lookup-or-create coordination for remote context caches

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;
use moka::ops::compute::Op;
use tokio::sync::Mutex;

use crate::domain::context_cache::{
    compute_key, extract_ttl_hint, fingerprint, format_ttl, partition_messages, ttl_or_default,
    CacheScope, CachedContentRequest, NoopObserver, RemoteCacheClient, RemoteExpiry, Resolution,
    ResolveEvent, ResolveInput, ResolveObserver, ResolveOutcome, ScopeKey, DEFAULT_TTL,
};
use crate::domain::llm::Message;
use crate::domain::DomainError;
use crate::infrastructure::context_cache::{CacheStats, ScopedTtlCache};

/// Configuration for context cache resolution
#[derive(Debug, Clone)]
pub struct ContextCacheConfig {
    /// TTL assumed when no hint or remote expiry is usable
    pub default_ttl: Duration,
    /// Serialize remote lookup/creation per scope key within this process
    pub serialize_creations: bool,
}

impl Default for ContextCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            serialize_creations: true,
        }
    }
}

impl ContextCacheConfig {
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Lets concurrent misses for the same key race to the remote service
    pub fn without_serialized_creations(mut self) -> Self {
        self.serialize_creations = false;
        self
    }
}

/// Cacheable portion of one resolve call, after partitioning
struct PendingContent {
    model: String,
    fingerprint: String,
    cached: Vec<Message>,
    tools: Option<serde_json::Value>,
    ttl_hint: Option<String>,
}

/// Resolves cache-marked content to a remote handle.
///
/// Order of resolution: local cache, remote lookup by label, remote creation.
/// The local cache is written only after a remote call succeeded, so a
/// cancelled resolve leaves no partial state behind.
#[derive(Debug)]
pub struct ContextCacheService {
    cache: Arc<ScopedTtlCache>,
    observer: Arc<dyn ResolveObserver>,
    config: ContextCacheConfig,
    /// Per-key locks; an entry lives only while some resolve holds or awaits it
    key_locks: MokaCache<ScopeKey, Arc<Mutex<()>>>,
}

impl ContextCacheService {
    pub fn new(cache: Arc<ScopedTtlCache>) -> Self {
        Self::with_config(cache, ContextCacheConfig::default())
    }

    pub fn with_config(cache: Arc<ScopedTtlCache>, config: ContextCacheConfig) -> Self {
        Self {
            cache,
            observer: Arc::new(NoopObserver),
            config,
            key_locks: MokaCache::builder().build(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ResolveObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn cache(&self) -> &Arc<ScopedTtlCache> {
        &self.cache
    }

    pub fn config(&self) -> &ContextCacheConfig {
        &self.config
    }

    /// Resolves the input to `(remainder, handle)`.
    ///
    /// A pre-resolved handle or input without cache-marked messages is
    /// returned unchanged. Otherwise the cached block (and tools) are replaced
    /// by a handle and only the remainder is returned.
    pub async fn resolve(
        &self,
        input: ResolveInput,
        scope: &CacheScope,
        client: &dyn RemoteCacheClient,
    ) -> Result<Resolution, DomainError> {
        let started = Instant::now();

        if input.cached_content.is_some() {
            self.emit(scope, None, ResolveOutcome::Bypassed, started);
            return Ok(Resolution::passthrough(input));
        }

        let ResolveInput {
            model,
            messages,
            tools,
            ttl,
            ..
        } = input;

        let partitioned = partition_messages(messages);

        if partitioned.cached.is_empty() {
            self.emit(scope, None, ResolveOutcome::NothingToCache, started);
            return Ok(Resolution {
                messages: partitioned.remainder,
                tools,
                cached_content: None,
            });
        }

        let fingerprint = match fingerprint(&partitioned.cached, tools.as_ref()) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.emit(scope, None, ResolveOutcome::Failed(e.kind()), started);
                return Err(e);
            }
        };

        let pending = PendingContent {
            model,
            fingerprint: fingerprint.clone(),
            cached: partitioned.cached,
            tools,
            ttl_hint: ttl,
        };

        match self.lookup_or_create(pending, scope, client).await {
            Ok((handle, outcome)) => {
                self.emit(scope, Some(fingerprint), outcome, started);
                Ok(Resolution {
                    messages: partitioned.remainder,
                    tools: None,
                    cached_content: Some(handle),
                })
            }
            Err(e) => {
                self.emit(scope, Some(fingerprint), ResolveOutcome::Failed(e.kind()), started);
                Err(e)
            }
        }
    }

    /// Drops the local entry for a fingerprint in a scope
    pub fn invalidate(&self, fingerprint: &str, scope: &CacheScope) -> Result<bool, DomainError> {
        self.cache.invalidate(fingerprint, scope)
    }

    pub fn stats(&self) -> Result<CacheStats, DomainError> {
        self.cache.stats()
    }

    async fn lookup_or_create(
        &self,
        pending: PendingContent,
        scope: &CacheScope,
        client: &dyn RemoteCacheClient,
    ) -> Result<(String, ResolveOutcome), DomainError> {
        if let Some(handle) = self.cache.get(&pending.fingerprint, scope)? {
            return Ok((handle, ResolveOutcome::LocalHit));
        }

        if !self.config.serialize_creations {
            return self.find_or_create(pending, scope, client).await;
        }

        let key = compute_key(&pending.fingerprint, scope);
        let lock = self
            .key_locks
            .get_with(key.clone(), async { Arc::new(Mutex::new(())) })
            .await;
        let guard = lock.lock_owned().await;

        // Another task may have finished while we waited for the lock
        let result = match self.cache.get(&pending.fingerprint, scope) {
            Ok(Some(handle)) => Ok((handle, ResolveOutcome::LocalHit)),
            Ok(None) => self.find_or_create(pending, scope, client).await,
            Err(e) => Err(e),
        };

        drop(guard);
        self.release_key_lock(key).await;
        result
    }

    async fn find_or_create(
        &self,
        pending: PendingContent,
        scope: &CacheScope,
        client: &dyn RemoteCacheClient,
    ) -> Result<(String, ResolveOutcome), DomainError> {
        if let Some(handle) = self.find_remote(&pending.fingerprint, scope, client).await? {
            return Ok((handle, ResolveOutcome::RemoteHit));
        }

        let handle = self.create_remote(pending, scope, client).await?;
        Ok((handle, ResolveOutcome::Created))
    }

    /// Drops the registry entry unless another resolve still holds a handle to it.
    ///
    /// Entries are never evicted otherwise, so a lock that is held or awaited
    /// stays the one every new resolve for the key receives.
    async fn release_key_lock(&self, key: ScopeKey) {
        self.key_locks
            .entry(key)
            .and_compute_with(|entry| async move {
                match entry {
                    // One reference in the registry, one in `entry`
                    Some(entry) if Arc::strong_count(entry.value()) <= 2 => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await;
    }

    async fn find_remote(
        &self,
        fingerprint: &str,
        scope: &CacheScope,
        client: &dyn RemoteCacheClient,
    ) -> Result<Option<String>, DomainError> {
        let found = match client.find_by_label(fingerprint, scope).await {
            Ok(found) => found,
            Err(e) if e.is_permission_denied() => {
                tracing::warn!(
                    provider = %scope.provider,
                    error = %e,
                    "Remote cache listing denied, treating as miss"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(content) = found.filter(|c| !c.name.is_empty()) else {
            return Ok(None);
        };

        let expiry = RemoteExpiry::parse(content.expire_time.as_deref());
        let Some(ttl) = expiry.remaining_or(self.config.default_ttl) else {
            tracing::debug!(
                handle = %content.name,
                expire_time = ?content.expire_time,
                "Remote cached content already expired"
            );
            return Ok(None);
        };

        self.cache.set(fingerprint, scope, content.name.clone(), ttl)?;

        Ok(Some(content.name))
    }

    async fn create_remote(
        &self,
        pending: PendingContent,
        scope: &CacheScope,
        client: &dyn RemoteCacheClient,
    ) -> Result<String, DomainError> {
        // Explicit hint first, then the hint on the cached content itself
        let ttl_hint = pending
            .ttl_hint
            .or_else(|| extract_ttl_hint(&pending.cached));
        let ttl = ttl_or_default(ttl_hint.as_deref(), self.config.default_ttl);

        let request = CachedContentRequest {
            model: pending.model,
            display_name: pending.fingerprint,
            contents: pending.cached,
            tools: pending.tools,
            ttl: Some(format_ttl(ttl)),
        };

        let created = client.create(&request, scope).await?;

        if created.name.is_empty() {
            return Err(DomainError::remote(
                500,
                "Remote service returned cached content without a name",
            ));
        }

        self.cache
            .set(&request.display_name, scope, created.name.clone(), ttl)?;

        Ok(created.name)
    }

    fn emit(
        &self,
        scope: &CacheScope,
        fingerprint: Option<String>,
        outcome: ResolveOutcome,
        started: Instant,
    ) {
        self.observer.on_resolve(&ResolveEvent {
            provider: scope.provider,
            fingerprint,
            outcome,
            latency: started.elapsed(),
        });
    }
}
