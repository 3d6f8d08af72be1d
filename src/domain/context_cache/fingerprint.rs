//! Cacheable-portion extraction and fingerprinting
//!
//! Pure functions: no I/O, deterministic for identical input.

use sha2::{Digest, Sha256};

use super::ttl::parse_ttl;
use crate::domain::llm::Message;
use crate::domain::DomainError;

/// Messages split into the cacheable block and everything else
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedMessages {
    pub cached: Vec<Message>,
    pub remainder: Vec<Message>,
}

/// Splits off the first contiguous block of cache-marked messages.
///
/// Cache-marked messages outside that block stay in the remainder, in order.
pub fn partition_messages(messages: Vec<Message>) -> PartitionedMessages {
    let Some(start) = messages.iter().position(Message::is_cached) else {
        return PartitionedMessages {
            cached: Vec::new(),
            remainder: messages,
        };
    };

    let end = messages[start..]
        .iter()
        .position(|m| !m.is_cached())
        .map_or(messages.len(), |offset| start + offset);

    let mut remainder = messages;
    let tail = remainder.split_off(end);
    let cached = remainder.split_off(start);
    remainder.extend(tail);

    PartitionedMessages { cached, remainder }
}

/// First well-formed TTL hint attached to the cached messages
pub fn extract_ttl_hint(cached: &[Message]) -> Option<String> {
    cached
        .iter()
        .flat_map(|m| m.content_parts())
        .filter_map(|part| part.cache_control())
        .filter_map(|control| control.ttl.as_deref())
        .find(|ttl| parse_ttl(ttl).is_some())
        .map(str::to_string)
}

/// Hex SHA-256 over the canonical JSON of the cached messages and tools
pub fn fingerprint(
    cached: &[Message],
    tools: Option<&serde_json::Value>,
) -> Result<String, DomainError> {
    let identity = serde_json::json!({
        "messages": cached,
        "tools": tools,
    });

    let canonical = serde_json::to_string(&identity).map_err(|e| {
        DomainError::serialization(format!("Failed to serialize cache identity: {}", e))
    })?;

    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}
