//! Removal listeners
//!
//! Every cache owns a [`ListenerSet`] and reports entries that leave it
//! without being explicitly removed. Notification is synchronous, on the
//! caller's thread, in registration order. A failing listener never
//! interrupts the operation that triggered it, nor the listeners after it.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Error a listener may report; the cache logs and discards it
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned from [`RemovalListener::on_removal`]
pub type ListenerResult = std::result::Result<(), ListenerError>;

/// Shared handle to a registered listener
pub type SharedListener<K, V> = Arc<dyn RemovalListener<K, V>>;

/// Why an entry left a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Dropped by a capacity bound, least recently used first
    Evicted,
    /// Dropped under memory pressure; the value is not reported
    Reclaimed,
    /// Older than the configured timeout
    Expired,
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Evicted => "evicted",
            Self::Reclaimed => "reclaimed",
            Self::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// Observer for policy-driven removals
pub trait RemovalListener<K, V>: Send + Sync {
    /// Called once per removed entry. `value` is `None` for reclaimed entries.
    fn on_removal(&self, key: &K, value: Option<&V>, cause: RemovalCause) -> ListenerResult;
}

impl<K, V, F> RemovalListener<K, V> for F
where
    F: Fn(&K, Option<&V>, RemovalCause) -> ListenerResult + Send + Sync,
{
    fn on_removal(&self, key: &K, value: Option<&V>, cause: RemovalCause) -> ListenerResult {
        self(key, value, cause)
    }
}

/// Wrap a closure as a [`SharedListener`]
///
/// Spelling the closure through this helper lets the compiler infer its
/// argument types.
pub fn listener<K, V, F>(f: F) -> SharedListener<K, V>
where
    F: Fn(&K, Option<&V>, RemovalCause) -> ListenerResult + Send + Sync + 'static,
    K: 'static,
    V: 'static,
{
    Arc::new(f)
}

/// Ordered, identity-keyed set of listeners
pub struct ListenerSet<K, V> {
    listeners: Vec<SharedListener<K, V>>,
}

impl<K, V> ListenerSet<K, V> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener. Returns `false` if it is already registered.
    pub fn add(&mut self, listener: SharedListener<K, V>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove(&mut self, listener: &SharedListener<K, V>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &SharedListener<K, V>) -> bool {
        self.listeners.iter().any(|l| Arc::ptr_eq(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver one removal to every listener in registration order
    pub fn notify(&self, key: &K, value: Option<&V>, cause: RemovalCause) {
        for (index, listener) in self.listeners.iter().enumerate() {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| listener.on_removal(key, value, cause)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(listener = index, %cause, %error, "removal listener failed");
                }
                Err(_) => {
                    tracing::warn!(listener = index, %cause, "removal listener panicked");
                }
            }
        }
    }
}

impl<K, V> Default for ListenerSet<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ListenerSet<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}
