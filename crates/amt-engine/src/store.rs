//! # Generic In-Memory Store
//!
//! Thread-safe, cloneable key-value store used for modules and review
//! records.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// Cloneable handle to a shared map. Clones see the same data.
///
/// The lock is `parking_lot` and never held across an `.await`, so a
/// panicking writer does not poison the store.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, T: Clone> Store<K, T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Insert only if the key is vacant. Returns the rejected value when
    /// the key is already taken; the check and the insert share one lock.
    pub fn insert_new(&self, id: K, value: T) -> Result<(), T> {
        let mut guard = self.data.write();
        if guard.contains_key(&id) {
            return Err(value);
        }
        guard.insert(id, value);
        Ok(())
    }

    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
