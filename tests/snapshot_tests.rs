//! Tests for index snapshot persistence
//!
//! These tests verify:
//! - Save/load round trips the full index and the recorded log length
//! - A missing snapshot loads as None (caller decides the policy)
//! - Saves atomically replace the previous snapshot
//! - A corrupted snapshot file surfaces a serialization error

use std::fs;
use std::path::PathBuf;

use caskdb::error::CaskError;
use caskdb::keydir::{IndexEntry, KeyDir};
use caskdb::snapshot;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_snapshot() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.idx");
    (temp_dir, path)
}

fn sample_keydir() -> KeyDir {
    let mut keydir = KeyDir::new();
    keydir.put(
        b"hello".to_vec(),
        IndexEntry {
            timestamp: 100,
            position: 0,
            total_size: 22,
        },
    );
    keydir.put(
        b"other".to_vec(),
        IndexEntry {
            timestamp: 101,
            position: 22,
            total_size: 30,
        },
    );
    keydir
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_save_load_round_trip() {
    let (_temp, path) = setup_temp_snapshot();
    let keydir = sample_keydir();

    snapshot::save(&path, 52, &keydir).unwrap();
    let (log_len, loaded) = snapshot::load(&path).unwrap().unwrap();

    assert_eq!(log_len, 52);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get(b"hello"), keydir.get(b"hello"));
    assert_eq!(loaded.get(b"other"), keydir.get(b"other"));
}

#[test]
fn test_save_empty_index() {
    let (_temp, path) = setup_temp_snapshot();

    snapshot::save(&path, 0, &KeyDir::new()).unwrap();
    let (log_len, loaded) = snapshot::load(&path).unwrap().unwrap();

    assert_eq!(log_len, 0);
    assert!(loaded.is_empty());
}

// =============================================================================
// Missing / Replaced / Corrupt
// =============================================================================

#[test]
fn test_load_missing_snapshot_is_none() {
    let (_temp, path) = setup_temp_snapshot();

    assert!(snapshot::load(&path).unwrap().is_none());
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let (_temp, path) = setup_temp_snapshot();

    snapshot::save(&path, 10, &sample_keydir()).unwrap();

    let mut second = KeyDir::new();
    second.put(
        b"only".to_vec(),
        IndexEntry {
            timestamp: 1,
            position: 0,
            total_size: 16,
        },
    );
    snapshot::save(&path, 16, &second).unwrap();

    let (log_len, loaded) = snapshot::load(&path).unwrap().unwrap();
    assert_eq!(log_len, 16);
    assert_eq!(loaded.len(), 1);
    assert!(loaded.get(b"only").is_some());
}

#[test]
fn test_save_leaves_no_temporary_file() {
    let (temp, path) = setup_temp_snapshot();

    snapshot::save(&path, 10, &sample_keydir()).unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["test.idx".to_string()]);
}

#[test]
fn test_load_corrupt_snapshot_is_serialization_error() {
    let (_temp, path) = setup_temp_snapshot();

    fs::write(&path, b"not a snapshot").unwrap();

    let err = snapshot::load(&path).unwrap_err();
    assert!(matches!(err, CaskError::Serialization(_)));
}
