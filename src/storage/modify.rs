//! Write batch entries
//!
//! A batch is an ordered `Vec<Modify>` applied atomically by
//! [`Storage::write`](super::Storage::write).

use serde::{Deserialize, Serialize};

/// A single modification inside a write batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modify {
    /// Set `key` to `value` in `cf`
    Put {
        cf: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Remove `key` from `cf` (no-op if absent)
    Delete { cf: String, key: Vec<u8> },
}

impl Modify {
    /// Build a put entry
    pub fn put(cf: impl Into<String>, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Modify::Put {
            cf: cf.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a delete entry
    pub fn delete(cf: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Modify::Delete {
            cf: cf.into(),
            key: key.into(),
        }
    }

    /// Column family this entry targets
    pub fn cf(&self) -> &str {
        match self {
            Modify::Put { cf, .. } | Modify::Delete { cf, .. } => cf,
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Modify::Put { key, .. } | Modify::Delete { key, .. } => key,
        }
    }

    /// Value being written, `None` for deletes
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Modify::Put { value, .. } => Some(value),
            Modify::Delete { .. } => None,
        }
    }
}
