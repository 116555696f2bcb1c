//! Checkpoint Writer
//!
//! Streams `(cf, key, value)` entries into a new checkpoint file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};
use crate::memtable::MemSnapshot;

use super::{COUNT_OFFSET, MAGIC, VERSION};

/// Builder for a checkpoint file
///
/// Entries go to `{path}.tmp`; `finish()` renames it over `path`.
pub struct CheckpointWriter {
    /// Final file path
    path: PathBuf,
    /// Temporary file path while building
    tmp_path: PathBuf,
    writer: BufWriter<File>,
    entry_count: u64,
    data_hasher: crc32fast::Hasher,
}

impl CheckpointWriter {
    /// Start a checkpoint that will cover the WAL up to `last_lsn`
    pub fn create(path: &Path, last_lsn: u64) -> Result<Self> {
        let tmp_path = path.with_extension("tmp");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut writer = BufWriter::new(file);

        // Entry count is a placeholder until finish()
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&last_lsn.to_le_bytes())?;
        writer.write_all(&0u64.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer,
            entry_count: 0,
            data_hasher: crc32fast::Hasher::new(),
        })
    }

    /// Write a whole snapshot and finish
    pub fn write_snapshot(path: &Path, last_lsn: u64, snapshot: &MemSnapshot) -> Result<u64> {
        let mut writer = Self::create(path, last_lsn)?;
        for (cf, key, value) in snapshot.iter() {
            writer.add(cf, key, value)?;
        }
        writer.finish()
    }

    /// Add one entry
    pub fn add(&mut self, cf: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let lens = [
            (cf.len() as u32).to_le_bytes(),
            (key.len() as u32).to_le_bytes(),
            (value.len() as u32).to_le_bytes(),
        ];

        for part in lens.iter().map(|l| l.as_slice()).chain([cf.as_bytes(), key, value]) {
            self.writer.write_all(part)?;
            self.data_hasher.update(part);
        }

        self.entry_count += 1;
        Ok(())
    }

    /// Write footer, patch the header count, sync and rename into place
    ///
    /// Returns the number of entries written.
    pub fn finish(mut self) -> Result<u64> {
        let data_crc = self.data_hasher.finalize();
        self.writer.write_all(&data_crc.to_le_bytes())?;
        self.writer.flush()?;

        let mut file = self.writer.into_inner().map_err(|e| {
            KvError::Checkpoint(format!("Failed to flush checkpoint: {}", e))
        })?;
        file.seek(SeekFrom::Start(COUNT_OFFSET))?;
        file.write_all(&self.entry_count.to_le_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;

        Ok(self.entry_count)
    }
}
