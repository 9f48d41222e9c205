//! Insertion-ordered in-memory mapping behind the facade.
//!
//! This is the single source of truth for synchronous reads. The merge rule
//! lives here too so that it runs under the same lock as caller writes.

use indexmap::IndexMap;
use std::collections::HashSet;

/// Outcome of merging a batch of loaded entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MergeStats {
    /// Entries inserted into the mapping.
    pub merged: usize,
    /// Entries discarded because the caller already owns the key.
    pub shadowed: usize,
}

/// Key/value entries plus the bookkeeping needed for caller-wins merging.
#[derive(Debug)]
pub(crate) struct Items {
    entries: IndexMap<String, String>,
    /// Keys the caller has set or removed while a load is pending.
    /// `None` once no load can arrive anymore.
    touched: Option<HashSet<String>>,
}

impl Items {
    /// Creates an empty mapping. `pending_load` starts key tracking.
    pub fn new(pending_load: bool) -> Self {
        Self {
            entries: IndexMap::new(),
            touched: pending_load.then(HashSet::new),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or overwrites `key`. An overwrite keeps the original position.
    pub fn set(&mut self, key: &str, value: String) {
        self.touch(key);
        if let Some(slot) = self.entries.get_mut(key) {
            *slot = value;
        } else {
            self.entries.insert(key.to_string(), value);
        }
    }

    /// Removes `key`, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.touch(key);
        self.entries.shift_remove(key)
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get_index(index).map(|(key, _)| key.as_str())
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts each loaded entry whose key the caller has not already
    /// claimed, then stops tracking caller keys.
    pub fn merge_loaded<I>(&mut self, loaded: I) -> MergeStats
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let touched = self.touched.take().unwrap_or_default();
        let mut stats = MergeStats::default();

        for (key, value) in loaded {
            if touched.contains(&key) || self.entries.contains_key(&key) {
                stats.shadowed += 1;
                continue;
            }
            self.entries.insert(key, value);
            stats.merged += 1;
        }

        stats
    }

    /// Stops tracking caller keys without merging anything.
    pub fn finish_load(&mut self) {
        self.touched = None;
    }

    fn touch(&mut self, key: &str) {
        if let Some(touched) = self.touched.as_mut()
            && !touched.contains(key)
        {
            touched.insert(key.to_string());
        }
    }
}
