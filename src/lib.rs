//! # caskdb
//!
//! A minimal log-structured key-value store in the Bitcask style:
//! - Append-only data log; every write is a new self-describing record
//! - In-memory index (keydir) from key to the log location of its
//!   latest record
//! - Index snapshot on close for fast restart
//! - Full log replay as the crash-recovery fallback
//!
//! ## Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────┐
//!                │            Engine            │
//!                │   get / set / delete / close │
//!                └───────┬──────────────┬───────┘
//!                        │              │
//!            ┌───────────▼───┐    ┌─────▼────────┐
//!            │    KeyDir     │    │  AppendLog   │
//!            │  key → offset │    │ (append-only │
//!            │  (in memory)  │    │   records)   │
//!            └───────┬───────┘    └─────▲────────┘
//!                    │                  │
//!            ┌───────▼───────┐    ┌─────┴────────┐
//!            │   Snapshot    │    │ Record Codec │
//!            │  (side file)  │    │ header + k/v │
//!            └───────────────┘    └──────────────┘
//! ```
//!
//! `set` encodes a record and appends it at the end of the log; the
//! keydir then points at that offset. `get` resolves the key through the
//! keydir, reads exactly that byte range, and decodes the value. On
//! close the keydir is snapshotted to a side file; on open it is
//! restored from the snapshot, falling back to a sequential log replay
//! when the snapshot is missing or behind the log.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod log;
pub mod keydir;
pub mod snapshot;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::{Config, SyncPolicy};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of caskdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
