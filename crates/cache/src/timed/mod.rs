//! Write-time expiry cache
//!
//! Each entry is stamped when written. Every operation first sweeps out
//! entries whose stamp is older than the timeout and reports them to
//! listeners. Reads never refresh the stamp, so an entry's lifetime is
//! measured from its last write, not its last access.

use crate::clock::{Clock, MonotonicClock};
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::listener::{ListenerSet, RemovalCause, SharedListener};
use crate::stats::CacheStats;
use crate::traits::forward_cache_impl;
use lru::LruCache;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Stamped<V> {
    value: V,
    written_at: Instant,
}

pub struct TimedExpiryCache<K, V, C = MonotonicClock> {
    /// Kept in write order: the least recently written entry is the oldest
    entries: LruCache<K, Stamped<V>>,
    timeout: Option<Duration>,
    clock: C,
    listeners: ListenerSet<K, V>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> TimedExpiryCache<K, V> {
    /// Entries expire `timeout` after their last write; `None` never expires
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_clock(timeout, MonotonicClock)
    }

    /// Millisecond timeout where any negative value disables expiry
    pub fn with_timeout_ms(timeout_ms: i64) -> Self {
        Self::new(u64::try_from(timeout_ms).ok().map(Duration::from_millis))
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(timeout_ms = config.timeout_ms, "creating timed expiry cache");
        Ok(Self::new(config.timeout()))
    }
}

impl<K: Hash + Eq, V, C: Clock> TimedExpiryCache<K, V, C> {
    pub fn with_clock(timeout: Option<Duration>, clock: C) -> Self {
        Self {
            entries: LruCache::unbounded(),
            timeout,
            clock,
            listeners: ListenerSet::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Look up `key`; does not extend its lifetime
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.expire_stale();
        let found = self.entries.peek(key).map(|entry| &entry.value);
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Write `value` and restart its lifetime
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.expire_stale();
        let written_at = self.clock.now();
        self.stats.insertions += 1;
        self.entries
            .put(key, Stamped { value, written_at })
            .map(|previous| previous.value)
    }

    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.put(key, value);
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.expire_stale();
        self.entries.pop(key).map(|entry| entry.value)
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.expire_stale();
        self.entries.contains(key)
    }

    pub fn contains_value(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.expire_stale();
        self.entries.iter().any(|(_, entry)| entry.value == *value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&mut self) -> usize {
        self.expire_stale();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Time left before `key` expires, `None` if absent or never expiring
    pub fn remaining(&mut self, key: &K) -> Option<Duration> {
        self.expire_stale();
        let timeout = self.timeout?;
        let entry = self.entries.peek(key)?;
        let age = self.clock.now().saturating_duration_since(entry.written_at);
        Some(timeout.saturating_sub(age))
    }

    pub fn add_removal_listener(&mut self, listener: SharedListener<K, V>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_removal_listener(&mut self, listener: &SharedListener<K, V>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry written more than `timeout` ago, oldest first
    fn expire_stale(&mut self) {
        let Some(timeout) = self.timeout else {
            return;
        };
        let now = self.clock.now();

        while let Some((_, oldest)) = self.entries.peek_lru() {
            if now.saturating_duration_since(oldest.written_at) <= timeout {
                break;
            }
            let Some((key, expired)) = self.entries.pop_lru() else {
                break;
            };
            self.stats.expirations += 1;
            tracing::trace!(age = ?now.saturating_duration_since(expired.written_at), "expired entry");
            self.listeners.notify(&key, Some(&expired.value), RemovalCause::Expired);
        }
    }
}

impl<K: Hash + Eq, V, C> fmt::Debug for TimedExpiryCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedExpiryCache")
            .field("len", &self.entries.len())
            .field("timeout", &self.timeout)
            .field("listeners", &self.listeners)
            .finish()
    }
}

forward_cache_impl!(TimedExpiryCache<K, V, C>, where K: Hash + Eq, C: Clock);
