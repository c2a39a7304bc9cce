//! Append Log
//!
//! The append-only data file backing the store. All writes are sequential
//! appends at the end of the file; all reads are positioned reads by
//! offset and length. The log is never rewritten in place — updates and
//! deletes always produce new trailing records.

mod recovery;

pub use recovery::{replay, ReplayReport};

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::SyncPolicy;
use crate::error::Result;

/// An open append-only log file
///
/// The write cursor always equals the physical length of the file; every
/// append advances it by exactly the buffer's length.
pub struct AppendLog {
    file: File,
    cursor: u64,
    sync_policy: SyncPolicy,
}

impl AppendLog {
    /// Open or create the log at `path`
    pub fn open(path: &Path, sync_policy: SyncPolicy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;
        let cursor = file.metadata()?.len();

        Ok(Self {
            file,
            cursor,
            sync_policy,
        })
    }

    /// Append a buffer at the end of the log, returning its starting offset
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let offset = self.cursor;
        self.file.write_all(bytes)?;
        self.cursor += bytes.len() as u64;

        if self.sync_policy == SyncPolicy::EveryWrite {
            self.file.sync_data()?;
        }

        Ok(offset)
    }

    /// Read exactly `len` bytes starting at `offset`
    ///
    /// A read past the current end of file is an I/O error; it means the
    /// index entry that produced this range is stale or corrupt.
    pub fn read_at(&mut self, offset: u64, len: u32) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Force buffered writes to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Cut the log back to `len` bytes
    ///
    /// Used once at open time to drop a partial trailing record left by a
    /// crash, so the next append lands on a record boundary.
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.cursor = len;
        Ok(())
    }

    /// Current write cursor, equal to the physical file length
    pub fn len(&self) -> u64 {
        self.cursor
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }
}
