//! Inputs and outputs of a resolve call

use serde::{Deserialize, Serialize};

use crate::domain::llm::Message;

/// Caller input to resolve against the remote context cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveInput {
    /// Model the cached content is created for
    pub model: String,
    pub messages: Vec<Message>,
    /// Tool declarations; part of the cache identity when content is cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<serde_json::Value>,
    /// Pre-resolved handle; bypasses caching when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
    /// Explicit TTL hint for creation, e.g. `"3600s"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl ResolveInput {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: serde_json::Value) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_cached_content(mut self, handle: impl Into<String>) -> Self {
        self.cached_content = Some(handle.into());
        self
    }

    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }
}

/// What the caller sends downstream after resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Messages that must still be sent inline
    pub messages: Vec<Message>,
    /// Tools still to be sent inline; `None` once folded into cached content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<serde_json::Value>,
    /// Remote handle to reference instead of the cached messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_content: Option<String>,
}

impl Resolution {
    pub(crate) fn passthrough(input: ResolveInput) -> Self {
        Self {
            messages: input.messages,
            tools: input.tools,
            cached_content: input.cached_content,
        }
    }
}

/// Request to create cached content remotely
#[derive(Debug, Clone, PartialEq)]
pub struct CachedContentRequest {
    pub model: String,
    /// Caller-visible label; always the fingerprint
    pub display_name: String,
    pub contents: Vec<Message>,
    pub tools: Option<serde_json::Value>,
    pub ttl: Option<String>,
}
