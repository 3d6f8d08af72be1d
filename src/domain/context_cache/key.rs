//! Scoped cache key derivation

use std::fmt;

use sha2::{Digest, Sha256};

use super::scope::CacheScope;

/// Length of the hex digest suffix appended to namespaced keys
const SCOPE_HASH_LEN: usize = 16;

/// Physical key of a local cache slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the slot key for a fingerprint within a scope.
///
/// The direct provider ignores the namespace. Namespaced providers with both
/// project and location keep the literal components and append a short
/// SHA-256 of `fingerprint:project:location`; without a complete namespace
/// the bare fingerprint is used.
pub fn compute_key(fingerprint: &str, scope: &CacheScope) -> ScopeKey {
    if !scope.provider.is_namespaced() {
        return ScopeKey(fingerprint.to_string());
    }

    match scope.namespace() {
        Some((project, location)) => {
            let joined = [fingerprint, project, location].join(":");
            let digest = hex::encode(Sha256::digest(joined.as_bytes()));
            ScopeKey(format!("{}:{}", joined, &digest[..SCOPE_HASH_LEN]))
        }
        None => ScopeKey(fingerprint.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context_cache::scope::ProviderKind;

    #[test]
    fn test_namespaced_key_format() {
        let key = compute_key("content-hash-123", &CacheScope::vertex("project-1", "global"));
        let parts: Vec<&str> = key.as_str().split(':').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(&parts[..3], &["content-hash-123", "project-1", "global"]);
        assert_eq!(parts[3].len(), SCOPE_HASH_LEN);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_is_deterministic() {
        let scope = CacheScope::vertex("project-1", "us-central1");
        assert_eq!(compute_key("abc", &scope), compute_key("abc", &scope));
    }

    #[test]
    fn test_different_namespaces_produce_different_keys() {
        let a = compute_key("abc", &CacheScope::vertex("project-1", "global"));
        let b = compute_key("abc", &CacheScope::vertex("project-2", "global"));
        let c = compute_key("abc", &CacheScope::vertex("project-1", "us-central1"));

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_gemini_ignores_namespace() {
        let scope = CacheScope::new(
            ProviderKind::Gemini,
            Some("project-1".into()),
            Some("global".into()),
        );

        assert_eq!(compute_key("abc", &scope).as_str(), "abc");
        assert_eq!(compute_key("abc", &CacheScope::gemini()).as_str(), "abc");
    }

    #[test]
    fn test_missing_namespace_falls_back_to_fingerprint() {
        let scope = CacheScope::new(ProviderKind::VertexAi, None, Some("global".into()));
        assert_eq!(compute_key("abc", &scope).as_str(), "abc");
    }

    #[test]
    fn test_beta_and_stable_vertex_share_keys() {
        let stable = compute_key("abc", &CacheScope::vertex("p", "global"));
        let beta = compute_key(
            "abc",
            &CacheScope::new(
                ProviderKind::VertexAiBeta,
                Some("p".into()),
                Some("global".into()),
            ),
        );

        assert_eq!(stable, beta);
    }
}
