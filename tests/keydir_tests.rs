//! Tests for the in-memory index (keydir)
//!
//! These tests verify:
//! - Put/get/remove semantics
//! - Unconditional last-write-wins replacement
//! - One entry per key, true removal on delete

use caskdb::keydir::{IndexEntry, KeyDir};

fn entry(timestamp: u32, position: u64, total_size: u32) -> IndexEntry {
    IndexEntry {
        timestamp,
        position,
        total_size,
    }
}

#[test]
fn test_put_and_get() {
    let mut keydir = KeyDir::new();

    keydir.put(b"hello".to_vec(), entry(1, 0, 22));

    assert_eq!(keydir.get(b"hello"), Some(&entry(1, 0, 22)));
    assert_eq!(keydir.get(b"missing"), None);
    assert_eq!(keydir.len(), 1);
}

#[test]
fn test_put_replaces_unconditionally() {
    let mut keydir = KeyDir::new();

    keydir.put(b"k".to_vec(), entry(10, 0, 20));
    // older timestamp still wins: replacement is unconditional, ordering
    // comes from the caller appending in log order
    keydir.put(b"k".to_vec(), entry(5, 20, 25));

    assert_eq!(keydir.get(b"k"), Some(&entry(5, 20, 25)));
    assert_eq!(keydir.len(), 1);
}

#[test]
fn test_remove() {
    let mut keydir = KeyDir::new();

    keydir.put(b"k".to_vec(), entry(1, 0, 13));

    assert_eq!(keydir.remove(b"k"), Some(entry(1, 0, 13)));
    assert_eq!(keydir.get(b"k"), None);
    assert_eq!(keydir.remove(b"k"), None);
    assert!(keydir.is_empty());
}

#[test]
fn test_keys_iterates_live_keys() {
    let mut keydir = KeyDir::new();

    keydir.put(b"a".to_vec(), entry(1, 0, 13));
    keydir.put(b"b".to_vec(), entry(2, 13, 13));
    keydir.remove(b"a");

    let keys: Vec<&[u8]> = keydir.keys().collect();
    assert_eq!(keys, vec![b"b".as_slice()]);
}
