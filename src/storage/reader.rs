//! Snapshot reader
//!
//! The `StorageReader` handed out by both storage implementations.

use crate::error::{KvError, Result};
use crate::memtable::MemSnapshot;

use super::{CfIterator, DbIterator, StorageReader};

/// Reader over a point-in-time snapshot of every column family
///
/// Writes committed after the reader was created are not visible through it.
pub struct SnapshotReader {
    snapshot: MemSnapshot,
    closed: bool,
}

impl SnapshotReader {
    pub(crate) fn new(snapshot: MemSnapshot) -> Self {
        Self {
            snapshot,
            closed: false,
        }
    }

    /// Whether `close()` has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(KvError::InvalidState("reader is closed".to_string()));
        }
        Ok(())
    }
}

impl StorageReader for SnapshotReader {
    fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_open()?;
        Ok(self.snapshot.get(cf, key)?.map(|v| v.to_vec()))
    }

    fn iter_cf(&self, cf: &str) -> Result<Box<dyn DbIterator + '_>> {
        self.check_open()?;
        // Iterator may only borrow from the snapshot, not from `cf`
        let map = self.snapshot.cf(cf)?;
        let name = self
            .snapshot
            .cf_name(cf)
            .ok_or_else(|| KvError::UnknownColumnFamily(cf.to_string()))?;
        Ok(Box::new(CfIterator::new(name, map)))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::trace!("reader released");
        }
    }
}

impl Drop for SnapshotReader {
    fn drop(&mut self) {
        self.close();
    }
}
