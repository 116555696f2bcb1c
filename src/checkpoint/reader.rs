//! Checkpoint Reader
//!
//! Loads and validates a checkpoint file in one pass.

use std::fs;
use std::path::Path;

use crate::error::{KvError, Result};
use crate::storage::Modify;

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// One `(cf, key, value)` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointEntry {
    pub cf: String,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Decoded checkpoint contents
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    /// Last WAL LSN covered by this checkpoint
    pub last_lsn: u64,
    pub entries: Vec<CheckpointEntry>,
}

impl Checkpoint {
    /// Entries as a put batch, for replay into a memtable
    pub fn into_batch(self) -> Vec<Modify> {
        self.entries
            .into_iter()
            .map(|e| Modify::Put {
                cf: e.cf,
                key: e.key,
                value: e.value,
            })
            .collect()
    }
}

/// Reader for checkpoint files
pub struct CheckpointReader;

impl CheckpointReader {
    /// Read and validate the checkpoint at `path`
    pub fn read(path: &Path) -> Result<Checkpoint> {
        let bytes = fs::read(path)?;

        if (bytes.len() as u64) < HEADER_SIZE + FOOTER_SIZE {
            return Err(KvError::Checkpoint(format!(
                "File too small: {} bytes",
                bytes.len()
            )));
        }

        if &bytes[0..4] != MAGIC {
            return Err(KvError::Checkpoint(format!(
                "Invalid checkpoint magic: expected RKVC, got {:?}",
                &bytes[0..4]
            )));
        }

        let mut cursor = Cursor::new(&bytes[4..HEADER_SIZE as usize]);
        let version = u16::from_le_bytes(cursor.array()?);
        if version != VERSION {
            return Err(KvError::Checkpoint(format!(
                "Unsupported checkpoint version: {}",
                version
            )));
        }
        let last_lsn = u64::from_le_bytes(cursor.array()?);
        let entry_count = u64::from_le_bytes(cursor.array()?);

        let data_end = bytes.len() - FOOTER_SIZE as usize;
        let data = &bytes[HEADER_SIZE as usize..data_end];
        let mut footer = Cursor::new(&bytes[data_end..]);
        let expected_crc = u32::from_le_bytes(footer.array()?);

        let actual_crc = crc32fast::hash(data);
        if actual_crc != expected_crc {
            return Err(KvError::Checkpoint(format!(
                "Data CRC mismatch: expected {:08x}, got {:08x}",
                expected_crc, actual_crc
            )));
        }

        let mut entries = Vec::with_capacity(entry_count.min(1 << 20) as usize);
        let mut cursor = Cursor::new(data);
        while !cursor.is_empty() {
            let cf_len = u32::from_le_bytes(cursor.array()?) as usize;
            let key_len = u32::from_le_bytes(cursor.array()?) as usize;
            let val_len = u32::from_le_bytes(cursor.array()?) as usize;

            let cf = String::from_utf8(cursor.take(cf_len)?.to_vec())
                .map_err(|e| KvError::Checkpoint(format!("Column family name: {}", e)))?;
            let key = cursor.take(key_len)?.to_vec();
            let value = cursor.take(val_len)?.to_vec();

            entries.push(CheckpointEntry { cf, key, value });
        }

        if entries.len() as u64 != entry_count {
            return Err(KvError::Checkpoint(format!(
                "Entry count mismatch: header {}, data {}",
                entry_count,
                entries.len()
            )));
        }

        Ok(Checkpoint { last_lsn, entries })
    }
}

/// Bounds-checked slice walker
struct Cursor<'a> {
    buf: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(KvError::Checkpoint(format!(
                "Truncated entry: need {} bytes, have {}",
                n,
                self.buf.len()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}
