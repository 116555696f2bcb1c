//! Checkpoint Module
//!
//! Full image of every column family, written when the WAL is truncated.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Header (22 bytes)                                               │
//! │   Magic: "RKVC" (4) | Version: u16 (2) | LastLSN: u64 (8)       │
//! │   | Count: u64 (8)                                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Data Block (variable)                                           │
//! │   [CfLen: u32][KeyLen: u32][ValLen: u32][Cf][Key][Value]        │
//! │   ... repeated for each entry, ordered by (cf, key) ...         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Footer (4 bytes)                                                │
//! │   DataCRC: u32                                                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//! All integers little-endian. The file is written next to its final
//! location and renamed into place, so a reader only ever sees a complete
//! checkpoint.

mod reader;
mod writer;

pub use reader::{Checkpoint, CheckpointEntry, CheckpointReader};
pub use writer::CheckpointWriter;

// =============================================================================
// Shared Constants
// =============================================================================

/// Magic bytes identifying a rawkv checkpoint file
pub(crate) const MAGIC: &[u8; 4] = b"RKVC";

/// Current checkpoint format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + LastLSN (8) + EntryCount (8)
pub(crate) const HEADER_SIZE: u64 = 22;

/// Footer size: DataCRC (4)
pub(crate) const FOOTER_SIZE: u64 = 4;

/// Offset of the entry count inside the header
pub(crate) const COUNT_OFFSET: u64 = 14;
