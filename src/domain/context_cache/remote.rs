//! Remote cached-content client contract

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use super::request::CachedContentRequest;
use super::scope::CacheScope;
use crate::domain::DomainError;

/// Cached content resource as reported by the remote service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteCachedContent {
    /// Opaque handle, e.g. `projects/p/locations/l/cachedContents/123`
    pub name: String,
    pub display_name: Option<String>,
    pub model: Option<String>,
    /// RFC 3339 expiry timestamp, when reported
    pub expire_time: Option<String>,
}

impl RemoteCachedContent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            model: None,
            expire_time: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_expire_time(mut self, expire_time: impl Into<String>) -> Self {
        self.expire_time = Some(expire_time.into());
        self
    }
}

/// Client for the remote cached-content API.
///
/// Errors carry an HTTP-like status: `RemoteTransport` for transport/HTTP
/// failures, `RemoteTimeout` for deadlines, `RemotePermissionDenied` for 403.
#[async_trait]
pub trait RemoteCacheClient: Send + Sync + Debug {
    /// Lists cached content visible in the scope
    async fn list(&self, scope: &CacheScope) -> Result<Vec<RemoteCachedContent>, DomainError>;

    /// Finds cached content whose display name equals `label`
    async fn find_by_label(
        &self,
        label: &str,
        scope: &CacheScope,
    ) -> Result<Option<RemoteCachedContent>, DomainError> {
        Ok(self
            .list(scope)
            .await?
            .into_iter()
            .find(|content| content.display_name.as_deref() == Some(label)))
    }

    /// Creates cached content and returns the new resource
    async fn create(
        &self,
        request: &CachedContentRequest,
        scope: &CacheScope,
    ) -> Result<RemoteCachedContent, DomainError>;
}
