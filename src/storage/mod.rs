//! Storage Module
//!
//! The contract the raw API is written against, plus two implementations.
//!
//! ## Contract
//! - [`Storage::reader`] hands out a request-scoped [`StorageReader`]
//! - [`StorageReader::iter_cf`] yields a forward [`DbIterator`] over one CF
//! - [`Storage::write`] applies a `Vec<Modify>` atomically
//!
//! ## Lifecycle
//! ```text
//! Reader:    Open ──close()/Drop──▶ Closed
//!
//! Iterator:  Created ──seek()──▶ Positioned ──next()──▶ ... ──▶ Exhausted
//!               │                    │                             │
//!               └────────────────────┴──────close()/Drop───────────┴──▶ Closed
//! ```
//! Readers and iterators release on `Drop`, so every early return through
//! `?` still releases them. An iterator borrows its reader and therefore
//! cannot outlive it.
//!
//! ## Implementations
//! - [`MemStorage`]: in-memory reference implementation
//! - [`StandaloneStorage`]: WAL + checkpoint backed, single node

mod iterator;
mod memory;
mod modify;
mod reader;
mod standalone;
mod traits;

pub use iterator::CfIterator;
pub use memory::MemStorage;
pub use modify::Modify;
pub use reader::SnapshotReader;
pub use standalone::StandaloneStorage;
pub use traits::{DbIterator, Storage, StorageReader};

// =============================================================================
// Column Family Names
// =============================================================================

/// Default column family
pub const CF_DEFAULT: &str = "default";

/// Column family reserved for lock records
pub const CF_LOCK: &str = "lock";

/// Column family reserved for commit records
pub const CF_WRITE: &str = "write";
