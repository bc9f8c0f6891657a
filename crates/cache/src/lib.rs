//! In-process caches for stowage
//!
//! This crate provides four single-policy-or-composed caches:
//! - [`BoundedRecencyCache`]: fixed capacity, least recently used evicted
//! - [`MemorySensitiveCache`]: entries reclaimed under memory pressure
//! - [`TieredCache`]: LRU primary tier demoting into a memory-sensitive tier
//! - [`TimedExpiryCache`]: entries expire a fixed time after their last write
//!
//! All of them share the [`Cache`] trait, report policy-driven removals to
//! [`RemovalListener`]s, and rely on external synchronization; wrap one in
//! [`Synchronized`] to share it between threads.

pub mod clock;
pub mod config;
pub mod errors;
pub mod listener;
pub mod recency;
pub mod soft;
pub mod stats;
pub mod sync;
pub mod tiered;
pub mod timed;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{CacheConfig, CacheConfigBuilder, CacheConfigLoader, ConfigSource, LoadedConfig};
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use listener::{
    listener, ListenerError, ListenerResult, ListenerSet, RemovalCause, RemovalListener,
    SharedListener,
};
pub use recency::BoundedRecencyCache;
pub use soft::{MemorySensitiveCache, ReclaimHandle, Weigher};
pub use stats::CacheStats;
pub use sync::Synchronized;
pub use tiered::TieredCache;
pub use timed::TimedExpiryCache;
pub use traits::Cache;
