//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::{KvError, Result};
use crate::storage::Modify;

use super::{WalEntry, WalReader};

/// Writes entries to the WAL file
pub struct WalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// LSN of the last appended entry (0 = none yet)
    current_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries written since the last fsync
    uncommitted: usize,
    /// Bytes in the file, up to the end of the last complete record
    size: u64,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
    #[cfg(test)]
    fault: Option<Fault>,
}

/// Failure injected into the next append
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
enum Fault {
    /// Write this many bytes of the record, then fail
    PartialWrite(usize),
    /// Write the whole record, then fail the fsync
    Sync,
    /// As `PartialWrite`, and the rollback fails too
    Rollback(usize),
}

impl WalWriter {
    /// Open or create a WAL file, continuing after its last valid entry
    ///
    /// The file is expected to have been recovered already; the scan stops
    /// at the first invalid record.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let mut last_lsn = 0;
        if path.exists() {
            for entry in WalReader::open(path)?.entries() {
                match entry {
                    Ok(entry) => last_lsn = entry.lsn,
                    Err(_) => break,
                }
            }
        }
        Self::open_with_lsn(path, sync_strategy, last_lsn)
    }

    /// Open or create a WAL file; the next entry gets `last_lsn + 1`
    pub fn open_with_lsn(path: &Path, sync_strategy: WalSyncStrategy, last_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            current_lsn: last_lsn,
            sync_strategy,
            uncommitted: 0,
            size,
            poisoned: false,
            #[cfg(test)]
            fault: None,
        })
    }

    /// Append a batch as one entry, returning its LSN
    ///
    /// On error the file is rolled back to the end of the previous record,
    /// so a failed append leaves nothing behind for recovery to replay. If
    /// the rollback fails as well the writer refuses every later append.
    pub fn append(&mut self, batch: Vec<Modify>) -> Result<u64> {
        if self.poisoned {
            return Err(KvError::WalWrite(format!(
                "{} is unusable after a failed rollback",
                self.path.display()
            )));
        }

        let lsn = self.current_lsn + 1;
        let bytes = WalEntry::new(lsn, batch).serialize()?;

        if let Err(e) = self.write_record(&bytes) {
            if let Err(rollback) = self.rollback() {
                self.poisoned = true;
                tracing::error!(
                    "WAL {}: rollback to {} bytes failed: {}",
                    self.path.display(),
                    self.size,
                    rollback
                );
            }
            return Err(KvError::WalWrite(format!("append lsn {}: {}", lsn, e)));
        }

        self.current_lsn = lsn;
        self.size += bytes.len() as u64;
        Ok(lsn)
    }

    /// Write one encoded record and flush or sync it per the strategy
    fn write_record(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(result) = self.injected_write(bytes) {
            return result;
        }

        self.writer.write_all(bytes)?;
        self.writer.flush()?;

        let pending = self.uncommitted + 1;
        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => pending >= count,
        };
        if should_sync {
            self.writer.get_ref().sync_data()?;
            self.uncommitted = 0;
        } else {
            self.uncommitted = pending;
        }
        Ok(())
    }

    /// Drop any buffered bytes and cut the file back to `size`
    fn rollback(&mut self) -> io::Result<()> {
        self.injected_rollback()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        file.set_len(self.size)?;
        file.sync_all()?;

        // into_parts hands back the buffer without flushing it
        let old = std::mem::replace(&mut self.writer, BufWriter::new(file));
        let (_, _discarded) = old.into_parts();

        tracing::warn!(
            "WAL {}: rolled back to {} bytes after a failed append",
            self.path.display(),
            self.size
        );
        Ok(())
    }

    #[cfg(not(test))]
    fn injected_write(&mut self, _bytes: &[u8]) -> Option<io::Result<()>> {
        None
    }

    #[cfg(not(test))]
    fn injected_rollback(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(test)]
    fn injected_write(&mut self, bytes: &[u8]) -> Option<io::Result<()>> {
        let fault = self.fault?;
        let result = match fault {
            Fault::PartialWrite(n) | Fault::Rollback(n) => self
                .writer
                .write_all(&bytes[..n.min(bytes.len())])
                .and_then(|_| self.writer.flush())
                .and_then(|_| Err(io::Error::new(io::ErrorKind::Other, "injected write failure"))),
            Fault::Sync => {
                self.fault = None;
                self.writer
                    .write_all(bytes)
                    .and_then(|_| self.writer.flush())
                    .and_then(|_| Err(io::Error::new(io::ErrorKind::Other, "injected sync failure")))
            }
        };
        Some(result)
    }

    #[cfg(test)]
    fn injected_rollback(&mut self) -> io::Result<()> {
        match self.fault.take() {
            Some(Fault::Rollback(_)) => Err(io::Error::new(
                io::ErrorKind::Other,
                "injected rollback failure",
            )),
            _ => Ok(()),
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Drop every entry from the file; LSNs keep increasing
    ///
    /// Also clears a poisoned state, since nothing of the failed append
    /// survives.
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;
        self.uncommitted = 0;
        self.size = 0;
        self.poisoned = false;

        tracing::debug!("WAL {} truncated at lsn {}", self.path.display(), self.current_lsn);
        Ok(())
    }

    /// Get the current LSN
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Entries appended since the last fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Current file size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a failed rollback has disabled further appends
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}
