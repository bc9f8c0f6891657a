//! The operation set shared by every cache in this crate

use crate::listener::SharedListener;

/// Map-like cache operations
///
/// None of the implementations lock internally. Share one between threads
/// through [`crate::Synchronized`].
pub trait Cache {
    type Key;
    type Value;

    /// Look up a value, applying the cache's access policy
    fn get(&mut self, key: &Self::Key) -> Option<&Self::Value>;

    /// Insert or replace a value, returning the previous one
    fn put(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    /// Insert every entry in iteration order
    fn put_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (Self::Key, Self::Value)>,
        Self: Sized,
    {
        for (key, value) in entries {
            self.put(key, value);
        }
    }

    /// Explicitly remove a value; never notifies listeners
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    fn contains_key(&mut self, key: &Self::Key) -> bool;

    fn contains_value(&mut self, value: &Self::Value) -> bool
    where
        Self::Value: PartialEq;

    /// Drop every entry without notifying listeners
    fn clear(&mut self);

    fn len(&mut self) -> usize;

    fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn add_removal_listener(&mut self, listener: SharedListener<Self::Key, Self::Value>) -> bool;

    fn remove_removal_listener(
        &mut self,
        listener: &SharedListener<Self::Key, Self::Value>,
    ) -> bool;
}

/// Implement [`Cache`] by forwarding to identically named inherent methods
macro_rules! forward_cache_impl {
    ($ty:ident < $($param:ident),+ >, where $($bounds:tt)+) => {
        impl<$($param),+> $crate::traits::Cache for $ty<$($param),+>
        where
            $($bounds)+
        {
            type Key = K;
            type Value = V;

            fn get(&mut self, key: &K) -> Option<&V> {
                <$ty<$($param),+>>::get(self, key)
            }

            fn put(&mut self, key: K, value: V) -> Option<V> {
                <$ty<$($param),+>>::put(self, key, value)
            }

            fn remove(&mut self, key: &K) -> Option<V> {
                <$ty<$($param),+>>::remove(self, key)
            }

            fn contains_key(&mut self, key: &K) -> bool {
                <$ty<$($param),+>>::contains_key(self, key)
            }

            fn contains_value(&mut self, value: &V) -> bool
            where
                Self::Value: PartialEq,
            {
                <$ty<$($param),+>>::contains_value(self, value)
            }

            fn clear(&mut self) {
                <$ty<$($param),+>>::clear(self)
            }

            fn len(&mut self) -> usize {
                <$ty<$($param),+>>::len(self)
            }

            fn add_removal_listener(
                &mut self,
                listener: $crate::listener::SharedListener<K, V>,
            ) -> bool {
                <$ty<$($param),+>>::add_removal_listener(self, listener)
            }

            fn remove_removal_listener(
                &mut self,
                listener: &$crate::listener::SharedListener<K, V>,
            ) -> bool {
                <$ty<$($param),+>>::remove_removal_listener(self, listener)
            }
        }
    };
}

pub(crate) use forward_cache_impl;
