//! Log replay
//!
//! Rebuilds the in-memory index by scanning the log sequentially, record
//! by record. This is the crash-recovery path: it runs when the index
//! snapshot is missing or behind the log, and it is a first-class
//! protocol, not an error case.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::keydir::{IndexEntry, KeyDir};
use crate::record::{Header, HEADER_SIZE, MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Outcome of a replay scan
#[derive(Debug)]
pub struct ReplayReport {
    /// Complete records scanned (values and tombstones)
    pub records: u64,

    /// Tombstones among them
    pub tombstones: u64,

    /// Offset of the first byte after the last complete record
    pub end_offset: u64,

    /// Whether a partial trailing record was found and left unindexed
    pub truncated_tail: bool,
}

/// Replay the log at `path` from `start_offset`, folding every record
/// into `keydir`
///
/// Value records insert or overwrite the entry for their key (later
/// records win); tombstones remove the key. The scan stops cleanly at the
/// first incomplete or undecodable record: everything before it stays
/// indexed, the tail is reported but never indexed.
pub fn replay(path: &Path, start_offset: u64, keydir: &mut KeyDir) -> Result<ReplayReport> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(start_offset))?;

    let mut offset = start_offset;
    let mut report = ReplayReport {
        records: 0,
        tombstones: 0,
        end_offset: start_offset,
        truncated_tail: false,
    };

    let mut header_buf = [0u8; HEADER_SIZE];
    loop {
        if offset == file_len {
            break;
        }
        if offset + HEADER_SIZE as u64 > file_len {
            report.truncated_tail = true;
            break;
        }

        reader.read_exact(&mut header_buf)?;
        let header = match Header::decode(&header_buf) {
            Ok(h) => h,
            Err(_) => {
                report.truncated_tail = true;
                break;
            }
        };

        // Sizes beyond the encode-time limits cannot have been written by
        // this store; treat the rest of the log as garbage.
        if header.key_size as usize > MAX_KEY_SIZE || header.value_size as usize > MAX_VALUE_SIZE {
            report.truncated_tail = true;
            break;
        }

        let total = header.total_size();
        if offset + total > file_len {
            report.truncated_tail = true;
            break;
        }

        let mut key = vec![0u8; header.key_size as usize];
        reader.read_exact(&mut key)?;
        reader.seek_relative(header.value_size as i64)?;

        if header.tombstone {
            keydir.remove(&key);
            report.tombstones += 1;
        } else {
            keydir.put(
                key,
                IndexEntry {
                    timestamp: header.timestamp,
                    position: offset,
                    total_size: total as u32,
                },
            );
        }

        report.records += 1;
        offset += total;
        report.end_offset = offset;
    }

    debug!(
        records = report.records,
        tombstones = report.tombstones,
        end_offset = report.end_offset,
        truncated_tail = report.truncated_tail,
        "log replay finished"
    );

    Ok(report)
}
