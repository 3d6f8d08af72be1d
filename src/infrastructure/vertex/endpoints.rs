//! Cached-contents endpoint construction

use reqwest::Url;

use crate::domain::context_cache::{CacheScope, ProviderKind};
use crate::domain::DomainError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const VERTEX_GLOBAL_BASE_URL: &str = "https://aiplatform.googleapis.com";

/// Collection URL for cached contents in one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedContentsEndpoint {
    base: Url,
    api_key: Option<String>,
}

impl CachedContentsEndpoint {
    /// Builds the endpoint for a scope.
    ///
    /// `api_base` replaces scheme and host while the resource path is kept.
    /// Gemini authenticates with an API key query parameter; Vertex scopes
    /// need both project and location.
    pub fn for_scope(
        scope: &CacheScope,
        api_base: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, DomainError> {
        let (host, path, api_key) = match scope.provider {
            ProviderKind::Gemini => {
                let key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    DomainError::configuration("Gemini cached contents require an API key")
                })?;
                (
                    GEMINI_BASE_URL.to_string(),
                    "v1beta/cachedContents".to_string(),
                    Some(key.to_string()),
                )
            }
            ProviderKind::VertexAi | ProviderKind::VertexAiBeta => {
                let (project, location) = scope.namespace().ok_or_else(|| {
                    DomainError::configuration(format!(
                        "{} cached contents require a project and location",
                        scope.provider
                    ))
                })?;
                let version = match scope.provider {
                    ProviderKind::VertexAiBeta => "v1beta1",
                    _ => "v1",
                };
                let host = if location == "global" {
                    VERTEX_GLOBAL_BASE_URL.to_string()
                } else {
                    format!("https://{}-aiplatform.googleapis.com", location)
                };
                (
                    host,
                    format!(
                        "{}/projects/{}/locations/{}/cachedContents",
                        version, project, location
                    ),
                    None,
                )
            }
        };

        let host = api_base.map(str::to_string).unwrap_or(host);
        let raw = format!("{}/{}", host.trim_end_matches('/'), path);
        let base = Url::parse(&raw).map_err(|e| {
            DomainError::configuration(format!("Invalid cached contents URL '{}': {}", raw, e))
        })?;

        Ok(Self { base, api_key })
    }

    /// URL for listing or creating, with an optional page token
    pub fn url(&self, page_token: Option<&str>) -> String {
        let mut url = self.base.clone();

        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        // An empty query leaves a trailing '?'
        if url.query() == Some("") {
            url.set_query(None);
        }

        url.into()
    }
}
