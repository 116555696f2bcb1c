//! MemTable implementation
//!
//! Column family maps behind a single `parking_lot::RwLock`.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{KvError, Result};
use crate::storage::Modify;

use super::CfMap;

/// Mutable state guarded by the table lock
struct Inner {
    cfs: BTreeMap<String, Arc<CfMap>>,
    /// Approximate size in bytes (sum of live key + value lengths)
    size: usize,
}

/// In-memory table holding every column family
///
/// ## Concurrency:
/// - `apply` takes the write lock for the whole batch, so readers never
///   observe half of a batch
/// - `snapshot` takes the read lock only long enough to clone the `Arc`s
pub struct MemTable {
    inner: RwLock<Inner>,
}

impl MemTable {
    /// Create an empty table with the given column families
    pub fn new<I, S>(column_families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cfs = column_families
            .into_iter()
            .map(|cf| (cf.into(), Arc::new(CfMap::new())))
            .collect();

        Self {
            inner: RwLock::new(Inner { cfs, size: 0 }),
        }
    }

    /// Whether `cf` is a known column family
    pub fn has_cf(&self, cf: &str) -> bool {
        self.inner.read().cfs.contains_key(cf)
    }

    /// Names of all column families, sorted
    pub fn column_families(&self) -> Vec<String> {
        self.inner.read().cfs.keys().cloned().collect()
    }

    /// Point lookup outside of any snapshot
    pub fn get(&self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read();
        let map = inner
            .cfs
            .get(cf)
            .ok_or_else(|| KvError::UnknownColumnFamily(cf.to_string()))?;
        Ok(map.get(key).cloned())
    }

    /// Check that every entry of `batch` can be applied
    pub fn validate(&self, batch: &[Modify]) -> Result<()> {
        let inner = self.inner.read();
        Self::validate_locked(&inner, batch)
    }

    fn validate_locked(inner: &Inner, batch: &[Modify]) -> Result<()> {
        match batch.iter().find(|m| !inner.cfs.contains_key(m.cf())) {
            Some(m) => Err(KvError::UnknownColumnFamily(m.cf().to_string())),
            None => Ok(()),
        }
    }

    /// Apply a batch atomically, in order
    ///
    /// Either every entry is applied or, if any entry is invalid, none is.
    /// Returns the new approximate size.
    pub fn apply(&self, batch: &[Modify]) -> Result<usize> {
        let mut inner = self.inner.write();
        Self::validate_locked(&inner, batch)?;

        let Inner { cfs, size } = &mut *inner;
        for modify in batch {
            // Presence checked by validate_locked under the same guard
            let Some(map) = cfs.get_mut(modify.cf()) else {
                continue;
            };
            let map = Arc::make_mut(map);

            match modify {
                Modify::Put { key, value, .. } => {
                    let added = key.len() + value.len();
                    match map.insert(key.clone(), value.clone()) {
                        Some(old) => *size = *size + value.len() - old.len(),
                        None => *size += added,
                    }
                }
                Modify::Delete { key, .. } => {
                    if let Some(old) = map.remove(key.as_slice()) {
                        *size -= key.len() + old.len();
                    }
                }
            }
        }

        Ok(*size)
    }

    /// Take a point-in-time snapshot of all column families
    pub fn snapshot(&self) -> MemSnapshot {
        MemSnapshot {
            cfs: self.inner.read().cfs.clone(),
        }
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Number of live keys across all column families
    pub fn entry_count(&self) -> usize {
        self.inner.read().cfs.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

/// Immutable view of every column family at one point in time
#[derive(Clone)]
pub struct MemSnapshot {
    cfs: BTreeMap<String, Arc<CfMap>>,
}

impl MemSnapshot {
    /// Contents of one column family
    pub fn cf(&self, cf: &str) -> Result<&CfMap> {
        self.cfs
            .get(cf)
            .map(|m| m.as_ref())
            .ok_or_else(|| KvError::UnknownColumnFamily(cf.to_string()))
    }

    /// The snapshot's own copy of a column family name
    pub fn cf_name(&self, cf: &str) -> Option<&str> {
        self.cfs.get_key_value(cf).map(|(name, _)| name.as_str())
    }

    pub fn get(&self, cf: &str, key: &[u8]) -> Result<Option<&[u8]>> {
        Ok(self.cf(cf)?.get(key).map(|v| v.as_slice()))
    }

    /// All `(cf, key, value)` triples, ordered by cf then key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8], &[u8])> + '_ {
        self.cfs.iter().flat_map(|(cf, map)| {
            map.iter()
                .map(move |(k, v)| (cf.as_str(), k.as_slice(), v.as_slice()))
        })
    }

    /// Number of live keys across all column families
    pub fn entry_count(&self) -> usize {
        self.cfs.values().map(|m| m.len()).sum()
    }
}
