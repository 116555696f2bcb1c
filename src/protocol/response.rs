//! Response definitions
//!
//! Represents responses to clients.

use super::{RawDeleteResponse, RawGetResponse, RawPutResponse, RawScanResponse};

/// Response frame types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseType {
    RawGet = 0x81,
    RawPut = 0x82,
    RawDelete = 0x83,
    RawScan = 0x84,
    Pong = 0x85,
    Error = 0xFF,
}

impl ResponseType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x81 => Some(ResponseType::RawGet),
            0x82 => Some(ResponseType::RawPut),
            0x83 => Some(ResponseType::RawDelete),
            0x84 => Some(ResponseType::RawScan),
            0x85 => Some(ResponseType::Pong),
            0xFF => Some(ResponseType::Error),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    RawGet(RawGetResponse),
    RawPut(RawPutResponse),
    RawDelete(RawDeleteResponse),
    RawScan(RawScanResponse),
    Pong,

    /// The request failed; no other response is sent for it
    Error(String),
}

impl Response {
    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    pub fn response_type(&self) -> ResponseType {
        match self {
            Response::RawGet(_) => ResponseType::RawGet,
            Response::RawPut(_) => ResponseType::RawPut,
            Response::RawDelete(_) => ResponseType::RawDelete,
            Response::RawScan(_) => ResponseType::RawScan,
            Response::Pong => ResponseType::Pong,
            Response::Error(_) => ResponseType::Error,
        }
    }
}
