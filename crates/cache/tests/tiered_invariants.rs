//! Invariant tests for the tiered cache

use proptest::prelude::*;
use std::collections::HashMap;
use stowage_cache::TieredCache;

#[derive(Debug, Clone)]
enum Op {
    Put(u16, u64),
    Get(u16),
    Remove(u16),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0u16..64, any::<u64>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0u16..64).prop_map(Op::Get),
        1 => (0u16..64).prop_map(Op::Remove),
    ]
}

proptest! {
    /// Without memory pressure the tiered cache loses nothing and never
    /// holds a key in both tiers.
    #[test]
    fn prop_no_loss_and_single_tier(
        max_size in 0usize..12,
        promote in any::<bool>(),
        ops in prop::collection::vec(arb_op(), 1..300),
    ) {
        let mut cache = TieredCache::new(max_size).promote_on_hit(promote);
        let mut model: HashMap<u16, u64> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    prop_assert_eq!(cache.put(key, value), model.insert(key, value));
                }
                Op::Get(key) => {
                    prop_assert_eq!(cache.get(&key).copied(), model.get(&key).copied());
                }
                Op::Remove(key) => {
                    prop_assert_eq!(cache.remove(&key), model.remove(&key));
                }
            }

            prop_assert!(cache.primary_len() <= max_size);
            prop_assert_eq!(cache.len(), model.len());
        }

        for key in 0u16..64 {
            prop_assert!(!(cache.in_primary(&key) && cache.in_overflow(&key)));
            prop_assert_eq!(cache.contains_key(&key), model.contains_key(&key));
        }
    }

    /// Reclaimed entries disappear, but survivors keep their values.
    #[test]
    fn prop_reclamation_only_removes(
        max_size in 1usize..8,
        count in 1u16..64,
        reclaim in 0usize..64,
    ) {
        let mut cache = TieredCache::new(max_size);
        for key in 0..count {
            cache.put(key, u64::from(key) * 3);
        }

        let before = cache.len();
        cache.reclaim_handle().reclaim_entries(reclaim);
        let overflow_before = before - cache.primary_len();

        prop_assert_eq!(cache.len(), before - reclaim.min(overflow_before));
        for key in 0..count {
            if let Some(value) = cache.get(&key) {
                prop_assert_eq!(*value, u64::from(key) * 3);
            }
        }
    }
}
