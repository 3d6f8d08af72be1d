//! Isolation scope for cached content handles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Remote provider variant a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google AI Studio: a single global account, no namespace
    Gemini,
    VertexAi,
    VertexAiBeta,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::VertexAi => "vertex_ai",
            Self::VertexAiBeta => "vertex_ai_beta",
        }
    }

    /// Whether handles of this provider live in a project/location namespace
    pub fn is_namespaced(&self) -> bool {
        !matches!(self, Self::Gemini)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Self::Gemini),
            "vertex_ai" => Ok(Self::VertexAi),
            "vertex_ai_beta" => Ok(Self::VertexAiBeta),
            other => Err(DomainError::validation(format!(
                "Unknown provider kind '{}'",
                other
            ))),
        }
    }
}

/// Scope a fingerprint is resolved in: provider plus optional project/location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheScope {
    pub provider: ProviderKind,
    pub project: Option<String>,
    pub location: Option<String>,
}

impl CacheScope {
    pub fn gemini() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            project: None,
            location: None,
        }
    }

    pub fn vertex(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::VertexAi,
            project: Some(project.into()),
            location: Some(location.into()),
        }
    }

    pub fn new(
        provider: ProviderKind,
        project: Option<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            provider,
            project,
            location,
        }
    }

    /// Project/location pair, only when both are present
    pub fn namespace(&self) -> Option<(&str, &str)> {
        match (self.project.as_deref(), self.location.as_deref()) {
            (Some(project), Some(location)) if !project.is_empty() && !location.is_empty() => {
                Some((project, location))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trip_names() {
        for kind in [
            ProviderKind::Gemini,
            ProviderKind::VertexAi,
            ProviderKind::VertexAiBeta,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }

        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_namespace_requires_both_parts() {
        assert_eq!(
            CacheScope::vertex("project-1", "global").namespace(),
            Some(("project-1", "global"))
        );

        let partial = CacheScope::new(ProviderKind::VertexAi, Some("project-1".into()), None);
        assert!(partial.namespace().is_none());

        let empty = CacheScope::new(
            ProviderKind::VertexAi,
            Some(String::new()),
            Some("global".into()),
        );
        assert!(empty.namespace().is_none());
    }

    #[test]
    fn test_gemini_is_not_namespaced() {
        assert!(!ProviderKind::Gemini.is_namespaced());
        assert!(ProviderKind::VertexAi.is_namespaced());
        assert!(ProviderKind::VertexAiBeta.is_namespaced());
    }
}
