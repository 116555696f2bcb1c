//! Request definitions
//!
//! Represents framed requests from clients.

use super::{RawDeleteRequest, RawGetRequest, RawPutRequest, RawScanRequest};

/// Request frame types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestType {
    RawGet = 0x01,
    RawPut = 0x02,
    RawDelete = 0x03,
    RawScan = 0x04,
    Ping = 0x05,
}

impl RequestType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(RequestType::RawGet),
            0x02 => Some(RequestType::RawPut),
            0x03 => Some(RequestType::RawDelete),
            0x04 => Some(RequestType::RawScan),
            0x05 => Some(RequestType::Ping),
            _ => None,
        }
    }
}

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    RawGet(RawGetRequest),
    RawPut(RawPutRequest),
    RawDelete(RawDeleteRequest),
    RawScan(RawScanRequest),

    /// Ping (health check)
    Ping,
}

impl Request {
    /// Get the request type
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::RawGet(_) => RequestType::RawGet,
            Request::RawPut(_) => RequestType::RawPut,
            Request::RawDelete(_) => RequestType::RawDelete,
            Request::RawScan(_) => RequestType::RawScan,
            Request::Ping => RequestType::Ping,
        }
    }
}
