//! Google cached-contents API (AI Studio and Vertex AI)

mod client;
mod endpoints;
mod http_client;
mod transformation;

pub use client::{VertexCachedContentClient, VertexClientConfig, DEFAULT_MAX_LIST_PAGES};
pub use endpoints::CachedContentsEndpoint;
pub use http_client::{HttpClient, HttpClientTrait};
pub use transformation::{build_create_body, model_resource};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
