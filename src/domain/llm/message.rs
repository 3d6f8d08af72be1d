use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Kind of cache marker attached to a content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheControlType {
    Ephemeral,
    /// Any marker type this crate does not act on
    #[serde(other)]
    Other,
}

/// Marks a content part as eligible for remote context caching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    #[serde(rename = "type")]
    pub kind: CacheControlType,
    /// Optional TTL hint such as `"3600s"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl CacheControl {
    pub fn ephemeral() -> Self {
        Self {
            kind: CacheControlType::Ephemeral,
            ttl: None,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.kind == CacheControlType::Ephemeral
    }

    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Content part for multimodal messages.
///
/// Part types other than `text` and `image_url` are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    ImageUrl {
        image_url: ImageUrl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            cache_control: None,
        }
    }

    pub fn cached_text(text: impl Into<String>, cache_control: CacheControl) -> Self {
        Self::Text {
            text: text.into(),
            cache_control: Some(cache_control),
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
            cache_control: None,
        }
    }

    pub fn cache_control(&self) -> Option<&CacheControl> {
        match self {
            Self::Text { cache_control, .. } | Self::ImageUrl { cache_control, .. } => {
                cache_control.as_ref()
            }
            Self::Other(_) => None,
        }
    }

    /// True when the part carries an ephemeral cache marker
    pub fn is_cache_marked(&self) -> bool {
        match self {
            Self::Other(raw) => {
                raw.pointer("/cache_control/type").and_then(|t| t.as_str()) == Some("ephemeral")
            }
            _ => self.cache_control().is_some_and(CacheControl::is_ephemeral),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    /// `null` or missing content, as on assistant tool-call turns
    #[default]
    Empty,
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default)]
    pub content: MessageContent,
    /// Remaining fields such as `tool_calls` or `tool_call_id`
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_parts(role: MessageRole, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
            extra: serde_json::Map::new(),
        }
    }

    /// Single text part flagged for caching, optionally with a TTL hint
    pub fn cached(role: MessageRole, text: impl Into<String>, ttl: Option<&str>) -> Self {
        let mut control = CacheControl::ephemeral();
        if let Some(ttl) = ttl {
            control = control.with_ttl(ttl);
        }

        Self::with_parts(role, vec![ContentPart::cached_text(text, control)])
    }

    pub fn content_parts(&self) -> Vec<&ContentPart> {
        match &self.content {
            MessageContent::Text(_) | MessageContent::Empty => vec![],
            MessageContent::Parts(parts) => parts.iter().collect(),
        }
    }

    /// True when any content part carries an ephemeral cache marker
    pub fn is_cached(&self) -> bool {
        self.content_parts().iter().any(|part| part.is_cache_marked())
    }
}
