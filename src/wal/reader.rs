//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{KvError, Result};

use super::entry::{RecordHeader, HEADER_SIZE};
use super::WalEntry;

/// Records larger than this are treated as a corrupted length field
const MAX_RECORD_SIZE: u32 = 256 * 1024 * 1024;

/// Outcome of reading one record
pub(crate) enum Record {
    Entry(WalEntry),
    /// Clean end of file
    Eof,
    /// Incomplete header or payload at the tail
    Torn,
    /// Complete record that fails validation
    Corrupt(KvError),
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Byte offset just past the last valid record
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at a clean end of file and `WalCorruption` for a
    /// torn or invalid record.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.read_record()? {
            Record::Entry(entry) => Ok(Some(entry)),
            Record::Eof => Ok(None),
            Record::Torn => Err(KvError::WalCorruption(format!(
                "Partial record at offset {}",
                self.position
            ))),
            Record::Corrupt(e) => Err(e),
        }
    }

    /// Offset just past the last record read successfully
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    pub(crate) fn read_record(&mut self) -> Result<Record> {
        let mut header = [0u8; HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(Record::Eof);
        }
        if read < HEADER_SIZE {
            return Ok(Record::Torn);
        }

        let header = RecordHeader::parse(&header)?;
        if header.len > MAX_RECORD_SIZE {
            return Ok(Record::Corrupt(KvError::WalCorruption(format!(
                "Record length {} exceeds maximum {}",
                header.len, MAX_RECORD_SIZE
            ))));
        }

        let mut data = vec![0u8; header.len as usize];
        if read_full(&mut self.reader, &mut data)? < data.len() {
            return Ok(Record::Torn);
        }

        match WalEntry::decode_payload(&header, &data) {
            Ok(entry) => {
                self.position += (HEADER_SIZE + data.len()) as u64;
                Ok(Record::Entry(entry))
            }
            Err(e) => Ok(Record::Corrupt(e)),
        }
    }
}

/// Like `read_exact`, but reports how many bytes were available
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(KvError::Io(e)),
        }
    }
    Ok(filled)
}

/// Iterator over WAL entries
///
/// Yields one error and then stops at the first invalid record.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
