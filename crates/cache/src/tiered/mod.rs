//! Two-tier cache: a bounded LRU tier backed by a memory-sensitive tier
//!
//! The primary tier holds the guaranteed-resident working set. Whatever it
//! evicts is demoted into the overflow tier instead of being dropped, and
//! stays retrievable until memory pressure reclaims it. A key lives in at
//! most one tier at a time.
//!
//! Listeners registered here only hear about entries that leave the cache
//! for good, which happens through overflow reclamation. Demotion is not
//! reported.

use crate::config::CacheConfig;
use crate::errors::Result;
use crate::listener::SharedListener;
use crate::recency::BoundedRecencyCache;
use crate::soft::{MemorySensitiveCache, ReclaimHandle};
use crate::stats::CacheStats;
use crate::traits::forward_cache_impl;
use std::fmt;
use std::hash::Hash;

pub struct TieredCache<K, V> {
    primary: BoundedRecencyCache<K, V>,
    overflow: MemorySensitiveCache<K, V>,
    promote_on_hit: bool,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> TieredCache<K, V> {
    /// Primary tier of `max_size` entries over an unbounded overflow tier
    pub fn new(max_size: usize) -> Self {
        Self::with_overflow(max_size, MemorySensitiveCache::new())
    }

    /// Primary tier of `max_size` entries over a caller-built overflow tier
    pub fn with_overflow(max_size: usize, overflow: MemorySensitiveCache<K, V>) -> Self {
        Self {
            primary: BoundedRecencyCache::new(max_size),
            overflow,
            promote_on_hit: false,
            stats: CacheStats::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let overflow = MemorySensitiveCache::from_config(config)?;
        let mut cache = Self::with_overflow(config.validated_max_size()?, overflow);
        cache.promote_on_hit = config.promote_on_hit;
        tracing::debug!(
            max_size = config.max_size,
            promote_on_hit = config.promote_on_hit,
            "creating tiered cache"
        );
        Ok(cache)
    }

    /// Move overflow hits back into the primary tier
    pub fn promote_on_hit(mut self, promote: bool) -> Self {
        self.promote_on_hit = promote;
        self
    }

    /// Look in the primary tier, then the overflow tier
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.primary.contains_key(key) {
            self.stats.record_lookup(true);
            return self.primary.get(key);
        }

        // A zero-sized primary tier would demote the entry straight back.
        if self.promote_on_hit && self.primary.max_size() > 0 {
            let Some((owned, value)) = self.overflow.remove_entry(key) else {
                self.stats.record_lookup(false);
                return None;
            };
            self.stats.record_lookup(true);
            self.stats.promotions += 1;
            self.store_primary(owned, value);
            return self.primary.peek(key);
        }

        let found = self.overflow.get(key);
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Write to the primary tier, first dropping any overflow copy
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let demoted_previous = self.overflow.remove(&key);
        let previous = self.store_primary(key, value);
        previous.or(demoted_previous)
    }

    pub fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.put(key, value);
        }
    }

    /// Remove from both tiers unconditionally
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let primary = self.primary.remove(key);
        let overflow = self.overflow.remove(key);
        primary.or(overflow)
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.primary.contains_key(key) || self.overflow.contains_key(key)
    }

    /// Scans both tiers; refreshes neither
    pub fn contains_value(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.primary.contains_value(value) || self.overflow.contains_value(value)
    }

    pub fn clear(&mut self) {
        self.primary.clear();
        self.overflow.clear();
    }

    pub fn len(&mut self) -> usize {
        self.primary.len() + self.overflow.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    pub fn add_removal_listener(&mut self, listener: SharedListener<K, V>) -> bool {
        self.overflow.add_removal_listener(listener)
    }

    pub fn remove_removal_listener(&mut self, listener: &SharedListener<K, V>) -> bool {
        self.overflow.remove_removal_listener(listener)
    }

    /// Memory-pressure handle for the overflow tier
    pub fn reclaim_handle(&self) -> ReclaimHandle {
        self.overflow.reclaim_handle()
    }

    pub fn in_primary(&self, key: &K) -> bool {
        self.primary.contains_key(key)
    }

    pub fn in_overflow(&mut self, key: &K) -> bool {
        self.overflow.contains_key(key)
    }

    pub fn primary_len(&self) -> usize {
        self.primary.len()
    }

    pub fn overflow_len(&mut self) -> usize {
        self.overflow.len()
    }

    /// Lookup and tier-movement counters, plus overflow reclamations
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            insertions: self.primary.stats().insertions,
            reclamations: self.overflow.stats().reclamations,
            ..self.stats
        }
    }

    fn store_primary(&mut self, key: K, value: V) -> Option<V> {
        let (previous, evicted) = self.primary.insert(key, value);
        if let Some((key, value)) = evicted {
            self.stats.demotions += 1;
            tracing::trace!(primary_len = self.primary.len(), "demoting entry to overflow tier");
            self.overflow.put(key, value);
        }
        previous
    }
}

impl<K, V> fmt::Debug for TieredCache<K, V>
where
    K: Hash + Eq,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCache")
            .field("primary", &self.primary)
            .field("overflow", &self.overflow)
            .field("promote_on_hit", &self.promote_on_hit)
            .finish()
    }
}

forward_cache_impl!(TieredCache<K, V>, where K: Hash + Eq);
