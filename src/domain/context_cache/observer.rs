//! Structured resolve events

use std::fmt::Debug;
use std::time::Duration;

use super::scope::ProviderKind;

/// Terminal outcome of one resolve call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Caller supplied a handle
    Bypassed,
    /// No cache-marked content in the input
    NothingToCache,
    LocalHit,
    RemoteHit,
    Created,
    /// Resolution failed with the given error kind
    Failed(&'static str),
}

impl ResolveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bypassed => "bypassed",
            Self::NothingToCache => "nothing_to_cache",
            Self::LocalHit => "local_hit",
            Self::RemoteHit => "remote_hit",
            Self::Created => "created",
            Self::Failed(_) => "failed",
        }
    }

    /// True when resolution completed without any remote call
    pub fn is_network_free(&self) -> bool {
        matches!(self, Self::Bypassed | Self::NothingToCache | Self::LocalHit)
    }
}

/// One event per resolve call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveEvent {
    pub provider: ProviderKind,
    /// Fingerprint, when one was derived
    pub fingerprint: Option<String>,
    pub outcome: ResolveOutcome,
    pub latency: Duration,
}

/// Receives resolve events; implementations must be cheap and non-blocking
pub trait ResolveObserver: Send + Sync + Debug {
    fn on_resolve(&self, event: &ResolveEvent);
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ResolveObserver for NoopObserver {
    fn on_resolve(&self, _event: &ResolveEvent) {}
}
