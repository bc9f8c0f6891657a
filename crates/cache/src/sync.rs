//! Mutex-guarded facade for sharing a cache between threads
//!
//! The caches keep multi-step invariants (recency order, tier exclusivity,
//! write-order stamps) and do no locking of their own. Wrapping one here
//! serializes every operation behind a single `parking_lot` mutex.
//!
//! Listeners run while the lock is held. A listener that calls back into
//! the same facade will deadlock.

use crate::listener::SharedListener;
use crate::traits::Cache;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;

pub struct Synchronized<C> {
    inner: Mutex<C>,
}

impl<C> Synchronized<C> {
    pub fn new(cache: C) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Run several operations as one atomic step
    pub fn with<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Hold the lock for direct access to the wrapped cache
    pub fn lock(&self) -> MutexGuard<'_, C> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }
}

impl<C: Cache> Synchronized<C> {
    /// Clone of the current value for `key`
    pub fn get(&self, key: &C::Key) -> Option<C::Value>
    where
        C::Value: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn put(&self, key: C::Key, value: C::Value) -> Option<C::Value> {
        self.inner.lock().put(key, value)
    }

    /// Insert every entry under a single lock acquisition
    pub fn put_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (C::Key, C::Value)>,
    {
        self.inner.lock().put_all(entries);
    }

    pub fn remove(&self, key: &C::Key) -> Option<C::Value> {
        self.inner.lock().remove(key)
    }

    pub fn contains_key(&self, key: &C::Key) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn contains_value(&self, value: &C::Value) -> bool
    where
        C::Value: PartialEq,
    {
        self.inner.lock().contains_value(value)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn add_removal_listener(&self, listener: SharedListener<C::Key, C::Value>) -> bool {
        self.inner.lock().add_removal_listener(listener)
    }

    pub fn remove_removal_listener(&self, listener: &SharedListener<C::Key, C::Value>) -> bool {
        self.inner.lock().remove_removal_listener(listener)
    }
}

impl<C> From<C> for Synchronized<C> {
    fn from(cache: C) -> Self {
        Self::new(cache)
    }
}

impl<C: fmt::Debug> fmt::Debug for Synchronized<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronized")
            .field("inner", &self.inner)
            .finish()
    }
}
