//! Memory-sensitive cache
//!
//! Entries in this cache may disappear at any time, for reasons outside the
//! caller's control. Two things reclaim them:
//!
//! - an optional weight budget, enforced on `put` by reclaiming randomly
//!   chosen entries other than the one just written;
//! - requests posted through a [`ReclaimHandle`] by whatever component tracks
//!   memory pressure. Requests queue on a channel and are applied lazily at
//!   the start of the next operation.
//!
//! Victims are picked uniformly at random, so no ordering guarantee exists.
//! Listeners see reclaimed entries with a `None` value.

mod handle;

pub use handle::ReclaimHandle;

use crate::config::CacheConfig;
use crate::errors::Result;
use crate::listener::{ListenerSet, RemovalCause, SharedListener};
use crate::stats::CacheStats;
use crate::traits::forward_cache_impl;
use crossbeam::channel::{self, Receiver, Sender};
use handle::Pressure;
use indexmap::IndexMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Computes the budget cost of an entry
pub type Weigher<K, V> = Arc<dyn Fn(&K, &V) -> u64 + Send + Sync>;

struct SoftEntry<V> {
    value: V,
    weight: u64,
}

pub struct MemorySensitiveCache<K, V> {
    entries: IndexMap<K, SoftEntry<V>>,
    /// `None` weighs every entry as 1
    weigher: Option<Weigher<K, V>>,
    max_weight: Option<u64>,
    /// Sum of entry weights; wide enough that no sequence of `u64` weights overflows
    weight: u128,
    pressure_tx: Sender<Pressure>,
    pressure_rx: Receiver<Pressure>,
    listeners: ListenerSet<K, V>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V> MemorySensitiveCache<K, V> {
    /// Unbounded cache; entries leave only through a [`ReclaimHandle`]
    pub fn new() -> Self {
        let (pressure_tx, pressure_rx) = channel::unbounded();
        Self {
            entries: IndexMap::new(),
            weigher: None,
            max_weight: None,
            weight: 0,
            pressure_tx,
            pressure_rx,
            listeners: ListenerSet::new(),
            stats: CacheStats::default(),
        }
    }

    /// Cache whose total weight never stays above `max_weight` after a `put`
    pub fn with_max_weight(max_weight: u64) -> Self {
        let mut cache = Self::new();
        cache.max_weight = Some(max_weight);
        cache
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(max_weight = ?config.overflow_max_weight, "creating memory-sensitive cache");
        let mut cache = Self::new();
        cache.max_weight = config.overflow_max_weight;
        Ok(cache)
    }

    /// Replace the weigher; only affects entries written afterwards
    pub fn weigher<F>(mut self, weigher: F) -> Self
    where
        F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
    {
        self.weigher = Some(Arc::new(weigher));
        self
    }

    /// Handle through which memory pressure is reported to this cache
    pub fn reclaim_handle(&self) -> ReclaimHandle {
        ReclaimHandle::new(self.pressure_tx.clone())
    }

    pub fn max_weight(&self) -> Option<u64> {
        self.max_weight
    }

    /// Total weight of the live entries, after applying pending reclamation
    ///
    /// Saturates at `u64::MAX`.
    pub fn weight(&mut self) -> u64 {
        self.drain_reclaimed();
        u64::try_from(self.weight).unwrap_or(u64::MAX)
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.drain_reclaimed();
        let found = self.entries.get(key).map(|entry| &entry.value);
        self.stats.record_lookup(found.is_some());
        found
    }

    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.drain_reclaimed();

        let weight = self.weigher.as_ref().map_or(1, |weigh| weigh(&key, &value));
        let (index, previous) = self.entries.insert_full(key, SoftEntry { value, weight });
        self.weight += u128::from(weight);
        if let Some(previous) = &previous {
            self.weight -= u128::from(previous.weight);
        }
        self.stats.insertions += 1;

        self.enforce_budget(index);
        previous.map(|entry| entry.value)
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
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove and return the stored key along with its value
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.drain_reclaimed();
        let (key, entry) = self.entries.swap_remove_entry(key)?;
        self.weight -= u128::from(entry.weight);
        Some((key, entry.value))
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.drain_reclaimed();
        self.entries.contains_key(key)
    }

    pub fn contains_value(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.drain_reclaimed();
        self.entries.values().any(|entry| entry.value == *value)
    }

    pub fn clear(&mut self) {
        // Pending requests target entries that no longer exist.
        while self.pressure_rx.try_recv().is_ok() {}
        self.entries.clear();
        self.weight = 0;
    }

    pub fn len(&mut self) -> usize {
        self.drain_reclaimed();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
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

    /// Apply every reclamation request posted since the last operation
    fn drain_reclaimed(&mut self) {
        while let Ok(pressure) = self.pressure_rx.try_recv() {
            match pressure {
                Pressure::Entries(count) => {
                    for _ in 0..count {
                        if !self.reclaim_random() {
                            break;
                        }
                    }
                }
                Pressure::Weight(target) => {
                    let mut freed = 0u64;
                    while freed < target {
                        match self.reclaim_random_weighted() {
                            Some(weight) => freed = freed.saturating_add(weight),
                            None => break,
                        }
                    }
                }
                Pressure::All => {
                    while let Some((key, entry)) = self.entries.pop() {
                        self.weight -= u128::from(entry.weight);
                        self.report_reclaimed(&key);
                    }
                }
            }
        }
    }

    /// Reclaim random entries until the budget holds, sparing `protected`
    /// unless it alone is over budget
    fn enforce_budget(&mut self, mut protected: usize) {
        let Some(max_weight) = self.max_weight.map(u128::from) else {
            return;
        };

        while self.weight > max_weight && self.entries.len() > 1 {
            let last = self.entries.len() - 1;
            let mut victim = fastrand::usize(..last);
            if victim >= protected {
                victim += 1;
            }
            self.reclaim_at(victim);
            // swap_remove moved the last entry into the victim's slot
            if protected == last {
                protected = victim;
            }
        }

        if self.weight > max_weight && !self.entries.is_empty() {
            self.reclaim_at(protected);
        }
    }

    fn reclaim_random(&mut self) -> bool {
        self.reclaim_random_weighted().is_some()
    }

    fn reclaim_random_weighted(&mut self) -> Option<u64> {
        if self.entries.is_empty() {
            return None;
        }
        let victim = fastrand::usize(..self.entries.len());
        Some(self.reclaim_at(victim))
    }

    fn reclaim_at(&mut self, index: usize) -> u64 {
        match self.entries.swap_remove_index(index) {
            Some((key, entry)) => {
                self.weight -= u128::from(entry.weight);
                self.report_reclaimed(&key);
                entry.weight
            }
            None => 0,
        }
    }

    fn report_reclaimed(&mut self, key: &K) {
        self.stats.reclamations += 1;
        tracing::trace!(remaining = self.entries.len(), "reclaimed entry");
        self.listeners.notify(key, None, RemovalCause::Reclaimed);
    }
}

impl<K: Hash + Eq, V> Default for MemorySensitiveCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for MemorySensitiveCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySensitiveCache")
            .field("len", &self.entries.len())
            .field("weight", &self.weight)
            .field("max_weight", &self.max_weight)
            .field("pending_reclaims", &self.pressure_rx.len())
            .finish()
    }
}

forward_cache_impl!(MemorySensitiveCache<K, V>, where K: Hash + Eq);
