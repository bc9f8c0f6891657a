//! Bounded least-recently-used cache
//!
//! Both `get` and `put` count as an access. When inserting a new key pushes
//! the entry count past `max_size`, the least recently accessed entry is
//! dropped and reported to listeners before `put` returns. Explicit removal
//! and `clear` are silent.

use crate::config::CacheConfig;
use crate::errors::Result;
use crate::listener::{ListenerSet, RemovalCause, SharedListener};
use crate::stats::CacheStats;
use crate::traits::forward_cache_impl;
use lru::LruCache;
use std::fmt;
use std::hash::Hash;

pub struct BoundedRecencyCache<K, V> {
    /// Unbounded storage; the bound is enforced here so `max_size == 0` works
    entries: LruCache<K, V>,
    max_size: usize,
    listeners: ListenerSet<K, V>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> BoundedRecencyCache<K, V> {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            max_size,
            listeners: ListenerSet::new(),
            stats: CacheStats::default(),
        }
    }

    /// Build from configuration, rejecting invalid settings up front
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let max_size = config.validated_max_size()?;
        tracing::debug!(max_size, "creating bounded recency cache");
        Ok(Self::new(max_size))
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Look up `key` and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let found = self.entries.get(key);
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Look up `key` without touching its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.peek(key)
    }

    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (previous, evicted) = self.insert(key, value);
        if let Some((key, value)) = evicted {
            self.listeners.notify(&key, Some(&value), RemovalCause::Evicted);
        }
        previous
    }

    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.put(key, value);
        }
    }

    /// Insert without notifying, handing back the evicted entry if any
    ///
    /// The tiered cache uses this to demote instead of discard.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Option<V>, Option<(K, V)>) {
        let previous = self.entries.put(key, value);
        self.stats.insertions += 1;

        let evicted = if self.entries.len() > self.max_size {
            self.entries.pop_lru()
        } else {
            None
        };
        if evicted.is_some() {
            self.stats.evictions += 1;
            tracing::trace!(
                max_size = self.max_size,
                "evicted least recently used entry"
            );
        }
        (previous, evicted)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.pop(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.entries.iter().any(|(_, v)| v == value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from least to most recently used; does not touch recency
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().rev()
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
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
}

impl<K: Hash + Eq, V> fmt::Debug for BoundedRecencyCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedRecencyCache")
            .field("len", &self.entries.len())
            .field("max_size", &self.max_size)
            .field("listeners", &self.listeners)
            .finish()
    }
}

forward_cache_impl!(BoundedRecencyCache<K, V>, where K: Hash + Eq);

#[cfg(test)]
mod tests;
