//! The key-to-sink table behind a mapped sink.

use std::{collections::HashMap, hash::Hash};

/// An unordered map from routing keys to resident sinks.
///
/// Holds at most one sink per key. Iteration order is whatever the
/// underlying `HashMap` yields, which is what eviction relies on.
pub(crate) struct RoutingTable<K, S> {
    entries: HashMap<K, S>,
}

impl<K, S> RoutingTable<K, S>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&S> {
        self.entries.get(key)
    }

    /// Inserts a sink for a key that is not resident and returns it.
    pub(crate) fn insert(&mut self, key: K, sink: S) -> &S {
        self.entries.entry(key).or_insert(sink)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes the first entry met while iterating whose key is not
    /// `current`. Not LRU, not insertion order.
    pub(crate) fn evict_other(&mut self, current: &K) -> Option<(K, S)> {
        let victim = self.entries.keys().find(|k| *k != current)?.clone();
        self.entries.remove_entry(&victim)
    }

    /// Detaches every entry, leaving the table empty.
    pub(crate) fn drain(&mut self) -> Vec<(K, S)> {
        self.entries.drain().collect()
    }
}
