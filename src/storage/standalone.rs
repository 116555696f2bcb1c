//! Standalone storage
//!
//! Durable single-node storage: every batch is logged to the WAL before it
//! reaches the memtable, and the memtable is periodically checkpointed so
//! the WAL can be truncated.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable and checkpoint file
//! - Serialize writers, let readers snapshot concurrently
//! - Checkpoint when the WAL grows past its limit
//! - Recover checkpoint + WAL on open

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::checkpoint::{CheckpointReader, CheckpointWriter};
use crate::config::Config;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::protocol::Context;
use crate::wal::{WalRecovery, WalWriter};

use super::{Modify, SnapshotReader, Storage, StorageReader};

/// WAL + checkpoint backed storage
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes**: serialized by the `wal` mutex
///   - validate → WAL append → memtable apply → maybe checkpoint
/// - **Reads**: `reader()` snapshots the memtable under its read lock and
///   never touches the WAL
pub struct StandaloneStorage {
    config: Config,

    /// In-memory state of every column family
    memtable: MemTable,

    /// Write-ahead log; its lock is also the writer lock
    wal: Mutex<WalWriter>,

    checkpoint_path: PathBuf,
}

impl StandaloneStorage {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const CHECKPOINT_FILENAME: &'static str = "checkpoint.ckpt";

    /// Open or create storage with the given config
    ///
    /// On startup:
    /// 1. Create data directory
    /// 2. Load the checkpoint if one exists
    /// 3. Recover the WAL and replay entries newer than the checkpoint
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let wal_path = config.data_dir.join(Self::WAL_FILENAME);
        let checkpoint_path = config.data_dir.join(Self::CHECKPOINT_FILENAME);

        let memtable = MemTable::new(config.column_families.iter().cloned());

        let mut last_lsn = 0;
        if checkpoint_path.exists() {
            let checkpoint = CheckpointReader::read(&checkpoint_path)?;
            last_lsn = checkpoint.last_lsn;
            let count = checkpoint.entries.len();
            memtable.apply(&checkpoint.into_batch())?;
            tracing::info!(
                "Loaded checkpoint: {} entries, last_lsn={}",
                count,
                last_lsn
            );
        }

        if wal_path.exists() {
            let (entries, result) = WalRecovery::recover(&wal_path)?;

            if result.entries_recovered > 0 || result.entries_corrupted > 0 {
                tracing::info!(
                    "WAL recovery: {} entries recovered, {} corrupted, last_lsn={}",
                    result.entries_recovered,
                    result.entries_corrupted,
                    result.last_lsn
                );
            }

            let checkpoint_lsn = last_lsn;
            let mut replayed = 0;
            for entry in entries.into_iter().filter(|e| e.lsn > checkpoint_lsn) {
                memtable.apply(&entry.batch)?;
                last_lsn = entry.lsn;
                replayed += 1;
            }
            if replayed > 0 {
                tracing::debug!("Replayed {} WAL entries", replayed);
            }
        }

        let wal = WalWriter::open_with_lsn(&wal_path, config.wal_sync_strategy, last_lsn)?;

        tracing::info!(
            "Standalone storage open at {} ({} keys)",
            config.data_dir.display(),
            memtable.entry_count()
        );

        Ok(Self {
            config,
            memtable,
            wal: Mutex::new(wal),
            checkpoint_path,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Checkpoint the memtable and truncate the WAL
    pub fn flush(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        self.checkpoint_locked(&mut wal)
    }

    /// Internal checkpoint (called with the WAL lock held)
    fn checkpoint_locked(&self, wal: &mut WalWriter) -> Result<()> {
        let last_lsn = wal.current_lsn();
        let snapshot = self.memtable.snapshot();

        // Step 1: Make every applied batch durable in the checkpoint
        let count = CheckpointWriter::write_snapshot(&self.checkpoint_path, last_lsn, &snapshot)?;

        // Step 2: WAL entries up to last_lsn are now redundant
        wal.truncate()?;

        tracing::info!("Checkpoint written: {} entries, last_lsn={}", count, last_lsn);
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the current memtable size
    pub fn memtable_size(&self) -> usize {
        self.memtable.size()
    }

    /// Bytes in the WAL since the last checkpoint
    pub fn wal_size(&self) -> u64 {
        self.wal.lock().size()
    }

    /// Number of live keys across all column families
    pub fn entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    /// LSN of the last logged batch
    pub fn last_lsn(&self) -> u64 {
        self.wal.lock().current_lsn()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Storage for StandaloneStorage {
    fn stop(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        self.checkpoint_locked(&mut wal)?;
        wal.sync()
    }

    fn write(&self, _ctx: &Context, batch: Vec<Modify>) -> Result<()> {
        let mut wal = self.wal.lock();

        // Step 1: Reject the whole batch before anything is logged
        self.memtable.validate(&batch)?;

        // Step 2: Log (durability guarantee)
        let lsn = wal.append(batch.clone())?;

        // Step 3: Apply
        self.memtable.apply(&batch)?;
        tracing::trace!("Applied batch lsn={} ({} entries)", lsn, batch.len());

        // Step 4: Checkpoint if needed. The batch is committed at this
        // point; a failed checkpoint is retried on the next write.
        if wal.size() >= self.config.wal_size_limit {
            if let Err(e) = self.checkpoint_locked(&mut wal) {
                tracing::warn!("Checkpoint after lsn={} failed: {}", lsn, e);
            }
        }

        Ok(())
    }

    fn reader(&self, _ctx: &Context) -> Result<Box<dyn StorageReader>> {
        Ok(Box::new(SnapshotReader::new(self.memtable.snapshot())))
    }
}
