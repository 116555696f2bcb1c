//! Raw API messages
//!
//! Request/response bodies for the four raw operations.

use serde::{Deserialize, Serialize};

use super::Context;

// =============================================================================
// Get
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGetRequest {
    pub context: Context,
    pub cf: String,
    pub key: Vec<u8>,
}

/// `value` is empty when `not_found` is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGetResponse {
    pub value: Vec<u8>,
    pub not_found: bool,
}

// =============================================================================
// Put
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPutRequest {
    pub context: Context,
    pub cf: String,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPutResponse {}

// =============================================================================
// Delete
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeleteRequest {
    pub context: Context,
    pub cf: String,
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeleteResponse {}

// =============================================================================
// Scan
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanRequest {
    pub context: Context,
    pub cf: String,
    /// Inclusive lower bound
    pub start_key: Vec<u8>,
    /// Maximum number of pairs returned
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanResponse {
    /// Strictly increasing by key
    pub kvs: Vec<KvPair>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KvPair {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
