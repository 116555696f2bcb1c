//! In-memory storage
//!
//! Reference implementation of the storage contract with no durability.

use crate::config::Config;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::protocol::Context;

use super::{Modify, SnapshotReader, Storage, StorageReader};

/// Storage that keeps every column family in memory
pub struct MemStorage {
    memtable: MemTable,
}

impl MemStorage {
    /// Create storage with the column families from `config`
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_column_families(config.column_families.iter().cloned()))
    }

    /// Create storage with an explicit set of column families
    pub fn with_column_families<I, S>(column_families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            memtable: MemTable::new(column_families),
        }
    }

    /// Number of live keys across all column families
    pub fn entry_count(&self) -> usize {
        self.memtable.entry_count()
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::with_column_families(Config::default().column_families)
    }
}

impl Storage for MemStorage {
    fn write(&self, _ctx: &Context, batch: Vec<Modify>) -> Result<()> {
        self.memtable.apply(&batch)?;
        Ok(())
    }

    fn reader(&self, _ctx: &Context) -> Result<Box<dyn StorageReader>> {
        Ok(Box::new(SnapshotReader::new(self.memtable.snapshot())))
    }
}
