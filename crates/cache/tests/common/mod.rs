//! Helpers shared by the integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use stowage_cache::{listener, RemovalCause, SharedListener};

pub type Event<K, V> = (K, Option<V>, RemovalCause);

/// Listener that records every notification it receives
///
/// Twin of the `Recorder` in `src/test_support.rs`; keep the two in sync.
pub struct Recorder<K, V> {
    events: Arc<Mutex<Vec<Event<K, V>>>>,
    pub listener: SharedListener<K, V>,
}

impl<K, V> Recorder<K, V>
where
    K: Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    pub fn new() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let listener = listener(move |key: &K, value: Option<&V>, cause| {
            sink.lock().push((key.clone(), value.cloned(), cause));
            Ok(())
        });
        Self { events, listener }
    }

    pub fn events(&self) -> Vec<Event<K, V>> {
        self.events.lock().clone()
    }
}

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("stowage_cache=trace")
        .with_test_writer()
        .try_init();
}
