//! Index (keydir)
//!
//! The in-memory mapping from key to the log location of its latest
//! record. Pure data structure: no I/O happens here. Iteration order over
//! keys is unspecified.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Location and freshness of a key's most recent record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Timestamp of the most recent record for this key
    pub timestamp: u32,

    /// Absolute byte offset of that record's header in the log
    pub position: u64,

    /// Total byte length of that record (header + key + value)
    pub total_size: u32,
}

/// In-memory key index
///
/// Holds at most one entry per live key (last write wins). Deleted keys
/// are removed outright; the tombstone in the log is what keeps the
/// deletion durable.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyDir {
    entries: HashMap<Vec<u8>, IndexEntry>,
}

impl KeyDir {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or unconditionally overwrite the entry for `key`
    pub fn put(&mut self, key: Vec<u8>, entry: IndexEntry) {
        self.entries.insert(key, entry);
    }

    /// Look up the entry for `key`
    pub fn get(&self, key: &[u8]) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    /// Remove the entry for `key`, returning it if present
    pub fn remove(&mut self, key: &[u8]) -> Option<IndexEntry> {
        self.entries.remove(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over live keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(Vec::as_slice)
    }
}
