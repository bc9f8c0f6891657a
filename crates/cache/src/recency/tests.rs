//! Tests for the bounded recency cache

use super::*;
use crate::listener::listener;
use crate::test_support::Recorder;
use crate::traits::Cache;

#[test]
fn test_overflow_evicts_least_recently_used() {
    let recorder = Recorder::new();
    let mut cache = BoundedRecencyCache::new(2);
    cache.add_removal_listener(recorder.listener.clone());

    cache.put("a", 1);
    cache.put("b", 2);
    cache.put("c", 3);

    assert_eq!(recorder.events(), vec![("a", Some(1), RemovalCause::Evicted)]);
    assert_eq!(cache.get(&"b"), Some(&2));
    assert_eq!(cache.get(&"c"), Some(&3));
    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_get_promotes_entry() {
    let recorder = Recorder::new();
    let mut cache = BoundedRecencyCache::new(3);
    cache.add_removal_listener(recorder.listener.clone());

    cache.put("k1", 1);
    cache.put("k2", 2);
    cache.put("k3", 3);
    assert_eq!(cache.get(&"k1"), Some(&1));

    cache.put("k4", 4);

    assert_eq!(recorder.events(), vec![("k2", Some(2), RemovalCause::Evicted)]);
    assert!(cache.contains_key(&"k1"));
    assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["k3", "k1", "k4"]);
}

#[test]
fn test_put_existing_key_refreshes_without_eviction() {
    let recorder = Recorder::new();
    let mut cache = BoundedRecencyCache::new(2);
    cache.add_removal_listener(recorder.listener.clone());

    cache.put("a", 1);
    cache.put("b", 2);
    assert_eq!(cache.put("a", 10), Some(1));
    assert!(recorder.events().is_empty());

    cache.put("c", 3);
    assert_eq!(recorder.events(), vec![("b", Some(2), RemovalCause::Evicted)]);
    assert_eq!(cache.peek(&"a"), Some(&10));
}

#[test]
fn test_peek_and_contains_do_not_touch_recency() {
    let mut cache = BoundedRecencyCache::new(2);
    cache.put(1, "one");
    cache.put(2, "two");

    assert_eq!(cache.peek(&1), Some(&"one"));
    assert!(cache.contains_key(&1));
    assert!(cache.contains_value(&"one"));
    assert_eq!(cache.iter().count(), 2);

    cache.put(3, "three");
    assert!(!cache.contains_key(&1));
}

#[test]
fn test_zero_capacity_evicts_every_insert() {
    let recorder = Recorder::new();
    let mut cache = BoundedRecencyCache::new(0);
    cache.add_removal_listener(recorder.listener.clone());

    assert_eq!(cache.put("a", 1), None);

    assert!(cache.is_empty());
    assert_eq!(recorder.events(), vec![("a", Some(1), RemovalCause::Evicted)]);
}

#[test]
fn test_remove_and_clear_are_silent() {
    let recorder = Recorder::new();
    let mut cache = BoundedRecencyCache::new(4);
    cache.add_removal_listener(recorder.listener.clone());
    cache.put_all([("a", 1), ("b", 2), ("c", 3)]);

    assert_eq!(cache.remove(&"a"), Some(1));
    assert_eq!(cache.remove(&"a"), None);
    assert_eq!(cache.remove(&"a"), None);
    cache.clear();

    assert!(cache.is_empty());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_failing_listener_does_not_block_later_listeners() {
    let recorder = Recorder::new();
    let mut cache = BoundedRecencyCache::new(1);
    cache.add_removal_listener(listener(|_, _, _| Err("first listener fails".into())));
    cache.add_removal_listener(recorder.listener.clone());

    cache.put("a", 1);
    cache.put("b", 2);

    assert_eq!(recorder.events(), vec![("a", Some(1), RemovalCause::Evicted)]);
    assert_eq!(cache.peek(&"b"), Some(&2));
}

#[test]
fn test_listener_registration() {
    let recorder = Recorder::<&str, i32>::new();
    let mut cache = BoundedRecencyCache::new(1);

    assert!(cache.add_removal_listener(recorder.listener.clone()));
    assert!(!cache.add_removal_listener(recorder.listener.clone()));
    assert!(cache.remove_removal_listener(&recorder.listener));
    assert!(!cache.remove_removal_listener(&recorder.listener));

    cache.put("a", 1);
    cache.put("b", 2);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_stats_track_lookups_and_evictions() {
    let mut cache = BoundedRecencyCache::new(1);
    cache.put("a", 1);
    cache.put("b", 2);
    cache.get(&"a");
    cache.get(&"b");

    let stats = cache.stats();
    assert_eq!(stats.insertions, 2);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_usable_through_cache_trait() {
    fn fill(cache: &mut impl Cache<Key = u32, Value = u32>) {
        cache.put_all((0..10).map(|i| (i, i * i)));
    }

    let mut cache = BoundedRecencyCache::new(4);
    fill(&mut cache);

    assert_eq!(Cache::len(&mut cache), 4);
    assert_eq!(Cache::get(&mut cache, &9), Some(&81));
    assert_eq!(Cache::get(&mut cache, &0), None);
}

#[test]
fn test_from_config_rejects_negative_capacity() {
    let config = CacheConfig {
        max_size: -1,
        ..CacheConfig::default()
    };

    let err = BoundedRecencyCache::<String, String>::from_config(&config).unwrap_err();
    assert!(err.is_configuration());
}
