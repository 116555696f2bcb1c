//! Storage contract traits

use crate::error::Result;
use crate::protocol::Context;

use super::Modify;

/// Abstract storage engine interface
///
/// Implementations must be safe to share across request threads. The
/// `Context` is an opaque routing token; implementations may use it, callers
/// forward it untouched.
pub trait Storage: Send + Sync {
    /// Prepare the storage for serving requests
    fn start(&self) -> Result<()> {
        Ok(())
    }

    /// Flush and release resources; no requests are served afterwards
    fn stop(&self) -> Result<()> {
        Ok(())
    }

    /// Apply `batch` atomically
    ///
    /// Entries are applied in order. If any entry fails validation, nothing
    /// from the batch is applied.
    fn write(&self, ctx: &Context, batch: Vec<Modify>) -> Result<()>;

    /// Acquire a reader scoped to one request
    fn reader(&self, ctx: &Context) -> Result<Box<dyn StorageReader>>;
}

/// Request-scoped read handle
///
/// Released exactly once: by an explicit `close()` or by `Drop`,
/// whichever comes first.
pub trait StorageReader: Send {
    /// Point lookup
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key present (value may be empty)
    /// - `Ok(None)`: key absent
    /// - `Err(InvalidState)`: reader already closed
    fn get_cf(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Forward iterator over one column family, initially unpositioned
    fn iter_cf(&self, cf: &str) -> Result<Box<dyn DbIterator + '_>>;

    /// Release the reader; further reads fail with `InvalidState`
    fn close(&mut self);
}

/// Forward cursor over one column family, ordered by key
pub trait DbIterator {
    /// Position at the first key >= `key`
    fn seek(&mut self, key: &[u8]) -> Result<()>;

    /// Whether the cursor is on an entry
    fn valid(&self) -> bool;

    /// Key under the cursor; `InvalidState` unless `valid()`
    fn key(&self) -> Result<&[u8]>;

    /// Value under the cursor; `InvalidState` unless `valid()`
    fn value(&self) -> Result<Vec<u8>>;

    /// Advance to the next entry; `InvalidState` unless `valid()`
    fn next(&mut self) -> Result<()>;

    /// Release the iterator; it reports `valid() == false` afterwards
    fn close(&mut self);
}
