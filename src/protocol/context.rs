//! Request context
//!
//! Routing token carried by every raw request. The raw API never looks
//! inside; it hands the value to the storage as received.

use serde::{Deserialize, Serialize};

/// Opaque routing / consistency token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub region_id: u64,
    pub region_epoch: Option<RegionEpoch>,
    pub peer: Option<Peer>,
    pub term: u64,
}

/// Region version pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEpoch {
    /// Bumped on membership change
    pub conf_ver: u64,
    /// Bumped on split/merge
    pub version: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: u64,
    pub store_id: u64,
}
