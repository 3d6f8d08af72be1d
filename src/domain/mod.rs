//! Domain layer - Core entities, contracts and errors

pub mod context_cache;
pub mod error;
pub mod llm;

pub use context_cache::{CacheScope, ProviderKind, RemoteCacheClient, ResolveInput, Resolution};
pub use error::DomainError;
pub use llm::{CacheControl, ContentPart, Message, MessageRole};
