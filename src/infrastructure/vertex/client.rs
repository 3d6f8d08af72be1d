use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use super::endpoints::CachedContentsEndpoint;
use super::http_client::HttpClientTrait;
use super::transformation::build_create_body;
use crate::domain::context_cache::{
    CacheScope, CachedContentRequest, ProviderKind, RemoteCacheClient, RemoteCachedContent,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_remote_call;

/// Upper bound on list pages fetched per lookup
pub const DEFAULT_MAX_LIST_PAGES: usize = 10;

/// Credentials and endpoint overrides for the cached-contents API
#[derive(Debug, Clone)]
pub struct VertexClientConfig {
    /// Replaces scheme and host of every request
    pub api_base: Option<String>,
    /// Google AI Studio key, used for the Gemini provider
    pub api_key: Option<String>,
    /// OAuth bearer token, used for Vertex providers
    pub access_token: Option<String>,
    pub max_list_pages: usize,
}

impl Default for VertexClientConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            api_key: None,
            access_token: None,
            max_list_pages: DEFAULT_MAX_LIST_PAGES,
        }
    }
}

impl VertexClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_max_list_pages(mut self, pages: usize) -> Self {
        self.max_list_pages = pages.max(1);
        self
    }
}

/// Cached-contents client for Google AI Studio and Vertex AI
#[derive(Debug)]
pub struct VertexCachedContentClient<C: HttpClientTrait> {
    client: C,
    config: VertexClientConfig,
}

impl<C: HttpClientTrait> VertexCachedContentClient<C> {
    pub fn new(client: C, config: VertexClientConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, scope: &CacheScope) -> Result<CachedContentsEndpoint, DomainError> {
        CachedContentsEndpoint::for_scope(
            scope,
            self.config.api_base.as_deref(),
            self.config.api_key.as_deref(),
        )
    }

    fn headers(&self, scope: &CacheScope) -> Result<Vec<(&str, String)>, DomainError> {
        let mut headers = vec![("Content-Type", "application/json".to_string())];

        if scope.provider != ProviderKind::Gemini {
            let token = self
                .config
                .access_token
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    DomainError::configuration("Vertex AI requests require an access token")
                })?;
            headers.push(("Authorization", format!("Bearer {}", token)));
        }

        Ok(headers)
    }

    /// Walks list pages until `stop` matches an item or pages run out
    async fn scan_pages<F>(
        &self,
        scope: &CacheScope,
        mut stop: F,
    ) -> Result<Vec<RemoteCachedContent>, DomainError>
    where
        F: FnMut(&RemoteCachedContent) -> bool + Send,
    {
        let endpoint = self.endpoint(scope)?;
        let headers = self.headers(scope)?;
        let mut collected = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.config.max_list_pages {
            let url = endpoint.url(page_token.as_deref());
            let header_refs = headers.iter().map(|(k, v)| (*k, v.as_str())).collect();
            let started = Instant::now();
            let result = self.client.get_json(&url, header_refs).await;
            record_remote_call(scope.provider.as_str(), "list", started.elapsed(), result.is_ok());
            let json = result?;

            let response: ListCachedContentsResponse = serde_json::from_value(json).map_err(|e| {
                DomainError::serialization(format!("Failed to parse cached contents list: {}", e))
            })?;

            for item in response.cached_contents {
                let content = item.into_domain();
                let found = stop(&content);
                collected.push(content);
                if found {
                    return Ok(collected);
                }
            }

            match response.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(collected),
            }

            if page + 1 == self.config.max_list_pages {
                tracing::warn!(
                    provider = %scope.provider,
                    pages = self.config.max_list_pages,
                    "Cached contents listing truncated at page limit"
                );
            }
        }

        Ok(collected)
    }
}

#[async_trait]
impl<C: HttpClientTrait> RemoteCacheClient for VertexCachedContentClient<C> {
    async fn list(&self, scope: &CacheScope) -> Result<Vec<RemoteCachedContent>, DomainError> {
        self.scan_pages(scope, |_| false).await
    }

    async fn find_by_label(
        &self,
        label: &str,
        scope: &CacheScope,
    ) -> Result<Option<RemoteCachedContent>, DomainError> {
        let matches = |c: &RemoteCachedContent| c.display_name.as_deref() == Some(label);
        let scanned = self.scan_pages(scope, matches).await?;

        Ok(scanned.into_iter().rev().find(matches))
    }

    async fn create(
        &self,
        request: &CachedContentRequest,
        scope: &CacheScope,
    ) -> Result<RemoteCachedContent, DomainError> {
        let url = self.endpoint(scope)?.url(None);
        let headers = self.headers(scope)?;
        let body = build_create_body(request, scope)?;

        tracing::debug!(
            provider = %scope.provider,
            display_name = %request.display_name,
            ttl = ?request.ttl,
            "Creating cached content"
        );

        let header_refs = headers.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let started = Instant::now();
        let result = self.client.post_json(&url, header_refs, &body).await;
        record_remote_call(scope.provider.as_str(), "create", started.elapsed(), result.is_ok());
        let json = result?;

        let created: CachedContentItem = serde_json::from_value(json).map_err(|e| {
            DomainError::serialization(format!("Failed to parse created cached content: {}", e))
        })?;

        Ok(created.into_domain())
    }
}

// Wire types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCachedContentsResponse {
    #[serde(default)]
    cached_contents: Vec<CachedContentItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedContentItem {
    #[serde(default)]
    name: String,
    display_name: Option<String>,
    model: Option<String>,
    expire_time: Option<String>,
}

impl CachedContentItem {
    fn into_domain(self) -> RemoteCachedContent {
        RemoteCachedContent {
            name: self.name,
            display_name: self.display_name,
            model: self.model,
            expire_time: self.expire_time,
        }
    }
}
