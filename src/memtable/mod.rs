//! MemTable Module
//!
//! In-memory, per-column-family state shared by every storage implementation.
//!
//! ## Responsibilities
//! - Hold one ordered map per column family
//! - Apply a batch of modifications atomically (validate all, then apply)
//! - Hand out cheap point-in-time snapshots to readers
//! - Track approximate size in bytes
//!
//! ## Data Structure Choice
//! Each column family is a `BTreeMap` behind an `Arc`:
//! - Ordered keys (required for forward iteration and checkpoints)
//! - A snapshot is a clone of the `Arc` handles, O(#cf)
//! - Writers use `Arc::make_mut`, so a map is only copied while a
//!   reader still holds the previous version

mod table;

use std::collections::BTreeMap;

pub use table::{MemSnapshot, MemTable};

/// Ordered contents of a single column family
pub type CfMap = BTreeMap<Vec<u8>, Vec<u8>>;
