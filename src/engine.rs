//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Own the append log and the keydir for the lifetime of the open state
//! - Route get/set/delete through codec, log, and index
//! - Restore the index on open: snapshot first, log replay as fallback
//! - Snapshot the index and sync the log on close
//!
//! ## Concurrency Model
//!
//! Single-threaded and synchronous: every operation runs to completion
//! before the next begins, and all mutation goes through `&mut self`.
//! The engine takes no file lock, so two instances must never open the
//! same log — concurrent writers would corrupt the write cursor. Callers
//! that need shared access put a lock or a single owning task above this
//! type.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::keydir::{IndexEntry, KeyDir};
use crate::log::{replay, AppendLog};
use crate::record::{Payload, Record};
use crate::snapshot;

/// The storage engine: an open log plus its in-memory index
///
/// Lifecycle is closed → open → closed. `open` constructs the engine;
/// `close` consumes it, so a second close cannot be expressed. Dropping
/// the engine without `close` releases the file handle but skips the
/// snapshot; the next open then recovers by replaying the log tail.
pub struct Engine {
    config: Config,
    log: AppendLog,
    keydir: KeyDir,
}

impl Engine {
    /// Open or create a store with the given config
    ///
    /// A fresh store (no log file) starts with an empty log and index.
    /// An existing store restores its index from the snapshot; if the
    /// snapshot is missing or behind the log, the missing range is
    /// replayed from the log itself. A partial trailing record left by a
    /// crash is cut off so the next append lands on a record boundary.
    pub fn open(config: Config) -> Result<Self> {
        for path in [&config.log_path, &config.snapshot_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let mut log = AppendLog::open(&config.log_path, config.sync_policy)?;

        let (mut keydir, replay_from) = match snapshot::load(&config.snapshot_path)? {
            Some((snap_len, keydir)) if snap_len <= log.len() => {
                if snap_len < log.len() {
                    info!(
                        snapshot_len = snap_len,
                        log_len = log.len(),
                        "snapshot behind log, replaying tail"
                    );
                }
                (keydir, (snap_len < log.len()).then_some(snap_len))
            }
            Some((snap_len, _)) => {
                warn!(
                    snapshot_len = snap_len,
                    log_len = log.len(),
                    "snapshot ahead of log, rebuilding index from scratch"
                );
                (KeyDir::new(), Some(0))
            }
            None if log.is_empty() => (KeyDir::new(), None),
            None => {
                info!(log_len = log.len(), "no snapshot, rebuilding index from log");
                (KeyDir::new(), Some(0))
            }
        };

        if let Some(start) = replay_from {
            let report = replay(&config.log_path, start, &mut keydir)?;
            info!(
                records = report.records,
                tombstones = report.tombstones,
                live_keys = keydir.len(),
                "log replay complete"
            );
            if report.truncated_tail {
                warn!(
                    end_offset = report.end_offset,
                    log_len = log.len(),
                    "discarding partial trailing record"
                );
                log.truncate(report.end_offset)?;
            }
        }

        Ok(Self {
            config,
            log,
            keydir,
        })
    }

    /// Open with default filenames under `dir` (convenience method)
    pub fn open_dir(dir: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::open(Config::in_dir(dir))
    }

    /// Get the current value for `key`, or `None` if absent
    ///
    /// Resolves the key through the index, reads exactly that record's
    /// byte range from the log, and decodes it. A decode failure here
    /// means the index and the log have diverged and is reported as a
    /// malformed-record error, never swallowed.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entry = match self.keydir.get(key) {
            Some(entry) => *entry,
            None => return Ok(None),
        };

        let bytes = self.log.read_at(entry.position, entry.total_size)?;
        let record = Record::decode(&bytes)?;

        match record.payload {
            Payload::Value(value) => Ok(Some(value)),
            Payload::Tombstone => Err(CaskError::MalformedRecord(
                "index entry points at a tombstone".to_string(),
            )),
        }
    }

    /// Set `key` to `value`
    ///
    /// Appends a new record stamped with the current time, then points
    /// the index at it. The record goes out in a single write, so a crash
    /// leaves at most one truncated tail for replay to discard; the index
    /// is only updated after the append succeeds.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let timestamp = unix_timestamp();
        let record = Record::value(timestamp, key, value);
        let bytes = record.encode()?;

        let position = self.log.append(&bytes)?;
        self.keydir.put(
            key.to_vec(),
            IndexEntry {
                timestamp,
                position,
                total_size: bytes.len() as u32,
            },
        );

        Ok(())
    }

    /// Delete `key`
    ///
    /// Appends a tombstone record for durability, then removes the key
    /// from the live index. Fails with `KeyNotFound` if the key is not
    /// currently indexed; nothing is written in that case.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        if self.keydir.get(key).is_none() {
            return Err(CaskError::KeyNotFound);
        }

        let record = Record::tombstone(unix_timestamp(), key);
        let bytes = record.encode()?;

        self.log.append(&bytes)?;
        self.keydir.remove(key);

        Ok(())
    }

    /// Close the store: sync the log, snapshot the index, release the
    /// file handle
    pub fn close(mut self) -> Result<()> {
        self.log.sync()?;
        snapshot::save(&self.config.snapshot_path, self.log.len(), &self.keydir)?;
        info!(
            live_keys = self.keydir.len(),
            log_len = self.log.len(),
            "store closed"
        );
        Ok(())
    }

    // =========================================================================
    // Accessors (for diagnostics and testing)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.keydir.len()
    }

    /// Whether the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.keydir.is_empty()
    }

    /// Current write cursor, equal to the physical log length
    pub fn log_len(&self) -> u64 {
        self.log.len()
    }

    /// Iterate over live keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.keydir.keys()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Current wall-clock time as whole seconds since the epoch, truncated
/// to the header's u32 field
fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
