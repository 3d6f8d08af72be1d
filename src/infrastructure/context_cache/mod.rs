//! Local context cache - scoped handle store and maintenance

mod local_cache;
mod sweeper;

pub use local_cache::{CacheStats, LocalCacheConfig, ScopedTtlCache, DEFAULT_SAFETY_MARGIN};
pub use sweeper::spawn_sweeper;
