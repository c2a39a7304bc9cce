//! Configuration for caskdb
//!
//! Centralized configuration with sensible defaults. The log path and the
//! snapshot path are inputs here, never hardcoded in the engine.

use std::path::{Path, PathBuf};

/// Main configuration for a caskdb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the append-only data log
    pub log_path: PathBuf,

    /// Path of the index snapshot written on close
    pub snapshot_path: PathBuf,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the log
    pub sync_policy: SyncPolicy,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// fsync only on close (default; a crash falls back to log replay)
    OnClose,

    /// fsync after every write (safest, slowest)
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./cask.log"),
            snapshot_path: PathBuf::from("./cask.idx"),
            sync_policy: SyncPolicy::OnClose,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Config with both files placed under `dir` using default filenames
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            log_path: dir.join("cask.log"),
            snapshot_path: dir.join("cask.idx"),
            sync_policy: SyncPolicy::OnClose,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data log path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Set the index snapshot path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Set the log sync strategy
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.config.sync_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
