//! Per-cache counters

/// Snapshot of a cache's activity since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    /// Entries dropped by a capacity bound
    pub evictions: u64,
    /// Entries dropped under memory pressure
    pub reclamations: u64,
    /// Entries dropped by timeout
    pub expirations: u64,
    /// Primary-tier evictions moved into the overflow tier
    pub demotions: u64,
    /// Overflow hits moved back into the primary tier
    pub promotions: u64,
}

impl CacheStats {
    pub(crate) fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    /// Fraction of lookups that found a value, `0.0` before the first lookup
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_ratio(), 0.0);

        stats.record_lookup(true);
        stats.record_lookup(true);
        stats.record_lookup(true);
        stats.record_lookup(false);

        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }
}
