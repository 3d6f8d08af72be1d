//! Context cache domain - scoping, fingerprints, TTLs and collaborator contracts

mod fingerprint;
mod key;
mod observer;
mod remote;
mod request;
mod scope;
mod ttl;

pub use fingerprint::{extract_ttl_hint, fingerprint, partition_messages, PartitionedMessages};
pub use key::{compute_key, ScopeKey};
pub use observer::{NoopObserver, ResolveEvent, ResolveObserver, ResolveOutcome};
pub use remote::{RemoteCacheClient, RemoteCachedContent};
pub use request::{CachedContentRequest, Resolution, ResolveInput};
pub use scope::{CacheScope, ProviderKind};
pub use ttl::{format_ttl, parse_ttl, ttl_or_default, RemoteExpiry, DEFAULT_TTL};

#[cfg(test)]
pub use observer::mock::RecordingObserver;
#[cfg(test)]
pub use remote::mock::{MockFailure, MockRemoteCacheClient};
