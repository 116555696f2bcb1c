//! Configuration for rawkv
//!
//! Centralized configuration with sensible defaults.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{KvError, Result};
use crate::storage::{CF_DEFAULT, CF_LOCK, CF_WRITE};

/// Main configuration for a rawkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for durable data (standalone storage only)
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log          (write-ahead log)
    ///     └── checkpoint.ckpt  (last full image of all column families)
    pub data_dir: PathBuf,

    /// Column families known to the storage; anything else is rejected
    pub column_families: Vec<String>,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    /// WAL bytes written since the last checkpoint that trigger a new one
    pub wal_size_limit: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Idle time after which a connection is closed (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./rawkv_data"),
            column_families: vec![
                CF_DEFAULT.to_string(),
                CF_LOCK.to_string(),
                CF_WRITE.to_string(),
            ],
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
            wal_size_limit: 64 * 1024 * 1024, // 64 MB
            listen_addr: "127.0.0.1:20160".to_string(),
            worker_threads: 8,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings that cannot be fixed up silently
    pub fn validate(&self) -> Result<()> {
        if self.column_families.is_empty() {
            return Err(KvError::Config(
                "at least one column family is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for cf in &self.column_families {
            if cf.is_empty() {
                return Err(KvError::Config("column family name is empty".to_string()));
            }
            if !seen.insert(cf.as_str()) {
                return Err(KvError::Config(format!("duplicate column family: {}", cf)));
            }
        }

        if self.worker_threads == 0 {
            return Err(KvError::Config("worker_threads must be > 0".to_string()));
        }

        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(KvError::Config(
                "EveryNEntries sync count must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Replace the set of column families
    pub fn column_families<I, S>(mut self, cfs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.column_families = cfs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the WAL size (in bytes) that triggers a checkpoint
    pub fn wal_size_limit(mut self, size: u64) -> Self {
        self.config.wal_size_limit = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
