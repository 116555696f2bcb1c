//! API Module
//!
//! Request handlers that sit between the wire protocol and the storage
//! contract.
//!
//! ## Responsibilities
//! - Translate each raw request into reader / write calls
//! - Forward the request context to the storage untouched
//! - Surface storage errors unchanged, with no retries

mod raw;

pub use raw::RawApi;
