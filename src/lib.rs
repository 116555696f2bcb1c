//! # rawkv
//!
//! Raw (non-transactional) key-value requests over a column-family
//! storage contract:
//! - Point get / put / delete and forward range scan per column family
//! - Request-scoped readers and iterators, released on every exit path
//! - Atomic multi-entry write batches
//! - In-memory and WAL + checkpoint backed storage engines
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (Acceptor + Worker Pool)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      RawApi                                  │
//! │            raw_get / raw_put / raw_delete / raw_scan         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ reader(ctx) / write(ctx, batch)
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │ MemStorage  │          │StandaloneStorage │
//!   └──────┬──────┘          └───┬──────────┬───┘
//!          │                     │          │
//!          ▼                     ▼          ▼
//!   ┌─────────────┐       ┌──────────┐ ┌────────────┐
//!   │  MemTable   │◀──────│   WAL    │ │ Checkpoint │
//!   │ (per CF)    │       └──────────┘ └────────────┘
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod api;
pub mod checkpoint;
pub mod memtable;
pub mod network;
pub mod protocol;
pub mod storage;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use api::RawApi;
pub use config::Config;
pub use error::{KvError, Result};
pub use protocol::Context;
pub use storage::{MemStorage, Modify, StandaloneStorage, Storage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rawkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
