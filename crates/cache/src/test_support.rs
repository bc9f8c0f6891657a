//! Shared helpers for unit tests

use crate::listener::{listener, RemovalCause, SharedListener};
use parking_lot::Mutex;
use std::sync::Arc;

/// Removal notification as seen by a listener
pub type Event<K, V> = (K, Option<V>, RemovalCause);

/// Listener that records every notification it receives
///
/// Twin of the `Recorder` in `tests/common/mod.rs`; keep the two in sync.
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
