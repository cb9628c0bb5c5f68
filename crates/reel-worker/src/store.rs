//! Job store abstraction.
//!
//! Export jobs, remote job records and the ingestion cache live behind
//! [`JobStore`]. Every method is one atomic operation on one key; no call
//! holds a lock across an await point.

use dashmap::DashMap;

/// Keyed record store.
pub trait JobStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    /// Insert or replace, returning the previous value.
    fn put(&self, key: &str, value: V) -> Option<V>;

    /// Insert only if `key` is vacant. Returns `false` if it was taken.
    fn insert_if_absent(&self, key: &str, value: V) -> bool;

    /// Mutate the value under `key` in place. Returns `false` if absent.
    fn update(&self, key: &str, f: &mut dyn FnMut(&mut V)) -> bool;

    fn remove(&self, key: &str) -> Option<V>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`JobStore`]. Contents are lost on restart.
#[derive(Debug)]
pub struct MemoryJobStore<V> {
    entries: DashMap<String, V>,
}

impl<V> MemoryJobStore<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryJobStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> JobStore<V> for MemoryJobStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, value: V) -> Option<V> {
        self.entries.insert(key.to_string(), value)
    }

    fn insert_if_absent(&self, key: &str, value: V) -> bool {
        match self.entries.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn update(&self, key: &str, f: &mut dyn FnMut(&mut V)) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => false,
        }
    }

    fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
