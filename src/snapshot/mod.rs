//! Index snapshot persistence
//!
//! Serializes the keydir to a side file on close so that a normal restart
//! never rescans the log. The snapshot also records the log length it was
//! taken at, which lets the engine detect a snapshot that is behind (or
//! ahead of) the physical log and replay accordingly.
//!
//! Saves are atomic: the snapshot is written to a temporary file, synced,
//! then renamed over the target, so a crash mid-save can never leave a
//! half-written snapshot behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CaskError, Result};
use crate::keydir::KeyDir;

/// On-disk snapshot payload
#[derive(Serialize, Deserialize)]
struct Snapshot {
    /// Log length at the moment the snapshot was taken
    log_len: u64,

    /// The full index
    keydir: KeyDir,
}

/// Atomically replace the snapshot at `path` with the given index
pub fn save(path: &Path, log_len: u64, keydir: &KeyDir) -> Result<()> {
    let bytes = bincode::serialize(&SnapshotRef { log_len, keydir })
        .map_err(|e| CaskError::Serialization(e.to_string()))?;

    let tmp_path = tmp_path(path);
    let mut tmp = File::create(&tmp_path)?;
    tmp.write_all(&bytes)?;
    tmp.sync_all()?;
    drop(tmp);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Serialization view over a borrowed keydir, layout-compatible with
/// `Snapshot`
#[derive(Serialize)]
struct SnapshotRef<'a> {
    log_len: u64,
    keydir: &'a KeyDir,
}

/// Load the snapshot at `path`
///
/// Returns `Ok(None)` if no snapshot exists; the caller decides whether
/// that means a fresh store or a replay fallback.
pub fn load(path: &Path) -> Result<Option<(u64, KeyDir)>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let snapshot: Snapshot =
        bincode::deserialize(&bytes).map_err(|e| CaskError::Serialization(e.to_string()))?;

    Ok(Some((snapshot.log_len, snapshot.keydir)))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
