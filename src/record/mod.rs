//! Record Codec
//!
//! Encoding and decoding for the on-disk log record.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────────┬───────────┐
//! │ timestamp(4) │ key_size (4) │ val_size (4) │ key ... │ value ... │
//! └──────────────┴──────────────┴──────────────┴─────────┴───────────┘
//! ```
//! All header fields are little-endian u32. Records are laid out
//! back-to-back in the log with no separators; a record's total size is
//! always `12 + key_size + value_size` and is recovered either from the
//! index or by reading the header during replay.
//!
//! The most significant bit of `val_size` is the tombstone flag. A
//! tombstone carries the flag and zero value bytes, so a deleted key can
//! never collide with a legitimate stored value. Value sizes are capped
//! far below 2^31, which keeps the flag bit unambiguous.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CaskError, Result};

/// Fixed header size: three little-endian u32 fields
pub const HEADER_SIZE: usize = 12;

/// Maximum key size (1 MiB)
pub const MAX_KEY_SIZE: usize = 1 << 20;

/// Maximum value size (256 MiB)
pub const MAX_VALUE_SIZE: usize = 1 << 28;

/// Tombstone marker bit in the value_size header field
const TOMBSTONE_FLAG: u32 = 1 << 31;

// =============================================================================
// Header
// =============================================================================

/// Decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Write time, seconds since epoch (truncated)
    pub timestamp: u32,

    /// Byte length of the key
    pub key_size: u32,

    /// Byte length of the value (zero for tombstones)
    pub value_size: u32,

    /// Whether this record marks a deletion
    pub tombstone: bool,
}

impl Header {
    /// Decode a header from the first 12 bytes of `buf`
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(CaskError::MalformedRecord(format!(
                "header needs {} bytes, got {}",
                HEADER_SIZE,
                buf.len()
            )));
        }

        let timestamp = buf.get_u32_le();
        let key_size = buf.get_u32_le();
        let raw_value_size = buf.get_u32_le();

        let tombstone = raw_value_size & TOMBSTONE_FLAG != 0;
        let value_size = raw_value_size & !TOMBSTONE_FLAG;

        if tombstone && value_size != 0 {
            return Err(CaskError::MalformedRecord(format!(
                "tombstone with non-zero value size {}",
                value_size
            )));
        }

        Ok(Self {
            timestamp,
            key_size,
            value_size,
            tombstone,
        })
    }

    /// Total on-disk size of the record this header describes
    pub fn total_size(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_size as u64 + self.value_size as u64
    }
}

// =============================================================================
// Record
// =============================================================================

/// Payload of a record: a stored value or a deletion marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A live value
    Value(Vec<u8>),

    /// A tombstone (deleted key)
    Tombstone,
}

/// A single self-describing log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Write time, seconds since epoch (truncated)
    pub timestamp: u32,

    /// The key bytes
    pub key: Vec<u8>,

    /// Stored value or deletion marker
    pub payload: Payload,
}

impl Record {
    /// Create a value record
    pub fn value(timestamp: u32, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            key: key.into(),
            payload: Payload::Value(value.into()),
        }
    }

    /// Create a tombstone record
    pub fn tombstone(timestamp: u32, key: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            key: key.into(),
            payload: Payload::Tombstone,
        }
    }

    /// Total encoded size of this record in bytes
    pub fn encoded_size(&self) -> usize {
        let value_len = match &self.payload {
            Payload::Value(v) => v.len(),
            Payload::Tombstone => 0,
        };
        HEADER_SIZE + self.key.len() + value_len
    }

    /// Encode the record to its on-disk representation
    ///
    /// Size limits are enforced here, before anything touches the log.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.key.len() > MAX_KEY_SIZE {
            return Err(CaskError::SizeLimitExceeded {
                what: "key",
                size: self.key.len(),
                max: MAX_KEY_SIZE,
            });
        }

        let (value, flag) = match &self.payload {
            Payload::Value(v) => (v.as_slice(), 0),
            Payload::Tombstone => (&[][..], TOMBSTONE_FLAG),
        };

        if value.len() > MAX_VALUE_SIZE {
            return Err(CaskError::SizeLimitExceeded {
                what: "value",
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.key.len() + value.len());
        buf.put_u32_le(self.timestamp);
        buf.put_u32_le(self.key.len() as u32);
        buf.put_u32_le(value.len() as u32 | flag);
        buf.put_slice(&self.key);
        buf.put_slice(value);

        Ok(buf.to_vec())
    }

    /// Decode a record from a buffer spanning exactly its on-disk bytes
    ///
    /// Fails with a malformed-record error if the buffer is shorter than
    /// the header or shorter than the lengths the header declares.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let header = Header::decode(buf)?;

        let total = header.total_size() as usize;
        if buf.len() < total {
            return Err(CaskError::MalformedRecord(format!(
                "record needs {} bytes, got {}",
                total,
                buf.len()
            )));
        }

        let key_end = HEADER_SIZE + header.key_size as usize;
        let key = buf[HEADER_SIZE..key_end].to_vec();

        let payload = if header.tombstone {
            Payload::Tombstone
        } else {
            Payload::Value(buf[key_end..key_end + header.value_size as usize].to_vec())
        };

        Ok(Self {
            timestamp: header.timestamp,
            key,
            payload,
        })
    }
}
