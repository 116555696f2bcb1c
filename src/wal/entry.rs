//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};
use crate::storage::Modify;

/// Record header: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL: one committed write batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The batch, applied atomically on replay
    pub batch: Vec<Modify>,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, batch: Vec<Modify>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            batch,
            timestamp,
        }
    }

    /// Encode as `LSN | CRC | LEN | bincode(self)`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(self)?;
        let crc = crc32fast::hash(&data);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&data);

        Ok(bytes)
    }

    /// Decode one complete record, verifying the CRC
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = RecordHeader::parse(bytes)?;

        let end = HEADER_SIZE + header.len as usize;
        if bytes.len() < end {
            return Err(KvError::WalCorruption(format!(
                "Incomplete record: expected {} bytes, got {}",
                end,
                bytes.len()
            )));
        }

        Self::decode_payload(&header, &bytes[HEADER_SIZE..end])
    }

    /// Total encoded size in bytes
    pub fn serialized_size(&self) -> Result<usize> {
        Ok(HEADER_SIZE + bincode::serialized_size(self)? as usize)
    }

    /// CRC32 of the encoded payload
    pub fn compute_crc(&self) -> Result<u32> {
        Ok(crc32fast::hash(&bincode::serialize(self)?))
    }

    pub(crate) fn decode_payload(header: &RecordHeader, data: &[u8]) -> Result<Self> {
        let actual = crc32fast::hash(data);
        if actual != header.crc {
            return Err(KvError::WalCorruption(format!(
                "CRC mismatch at lsn {}: expected {:08x}, got {:08x}",
                header.lsn, header.crc, actual
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| KvError::WalCorruption(format!("Undecodable record: {}", e)))?;

        if entry.lsn != header.lsn {
            return Err(KvError::WalCorruption(format!(
                "LSN mismatch: header {}, payload {}",
                header.lsn, entry.lsn
            )));
        }

        Ok(entry)
    }
}

/// Fixed-size prefix of every record
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl RecordHeader {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(KvError::WalCorruption(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&bytes[0..8]);
        crc.copy_from_slice(&bytes[8..12]);
        len.copy_from_slice(&bytes[12..16]);

        Ok(Self {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        })
    }
}
