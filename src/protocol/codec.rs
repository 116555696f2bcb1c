//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Type (1) │ Len (4)  │     Payload (bincode)       │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! `Len` is big-endian. Ping/Pong carry no payload; Error carries the
//! message as raw UTF-8.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KvError, Result};

use super::{Request, RequestType, Response, ResponseType};

/// Header size: 1 byte type + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Framing
// =============================================================================

fn frame(frame_type: u8, payload: &[u8]) -> Result<Bytes> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u8(frame_type);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Split a complete frame into `(type, payload)`
fn unframe(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let frame_type = header.get_u8();
    let payload_len = header.get_u32();
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(KvError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((frame_type, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(len: u32) -> Result<()> {
    if len > MAX_PAYLOAD_SIZE {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

fn encode_body<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(body)?)
}

fn decode_body<T: DeserializeOwned>(what: &str, payload: &[u8]) -> Result<T> {
    bincode::deserialize(payload)
        .map_err(|e| KvError::Protocol(format!("{}: malformed payload: {}", what, e)))
}

fn expect_empty(what: &str, payload: &[u8]) -> Result<()> {
    if !payload.is_empty() {
        return Err(KvError::Protocol(format!(
            "{}: unexpected payload of {} bytes",
            what,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to a complete frame
pub fn encode_request(request: &Request) -> Result<Bytes> {
    let payload = match request {
        Request::RawGet(req) => encode_body(req)?,
        Request::RawPut(req) => encode_body(req)?,
        Request::RawDelete(req) => encode_body(req)?,
        Request::RawScan(req) => encode_body(req)?,
        Request::Ping => Vec::new(),
    };
    frame(request.request_type() as u8, &payload)
}

/// Decode a request from a complete frame
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (frame_type, payload) = unframe(bytes)?;

    match RequestType::from_u8(frame_type) {
        Some(RequestType::RawGet) => Ok(Request::RawGet(decode_body("RawGet", payload)?)),
        Some(RequestType::RawPut) => Ok(Request::RawPut(decode_body("RawPut", payload)?)),
        Some(RequestType::RawDelete) => {
            Ok(Request::RawDelete(decode_body("RawDelete", payload)?))
        }
        Some(RequestType::RawScan) => Ok(Request::RawScan(decode_body("RawScan", payload)?)),
        Some(RequestType::Ping) => {
            expect_empty("Ping", payload)?;
            Ok(Request::Ping)
        }
        None => Err(KvError::Protocol(format!(
            "Unknown request type: 0x{:02x}",
            frame_type
        ))),
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to a complete frame
pub fn encode_response(response: &Response) -> Result<Bytes> {
    let payload = match response {
        Response::RawGet(resp) => encode_body(resp)?,
        Response::RawPut(resp) => encode_body(resp)?,
        Response::RawDelete(resp) => encode_body(resp)?,
        Response::RawScan(resp) => encode_body(resp)?,
        Response::Pong => Vec::new(),
        Response::Error(message) => message.as_bytes().to_vec(),
    };
    frame(response.response_type() as u8, &payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (frame_type, payload) = unframe(bytes)?;

    match ResponseType::from_u8(frame_type) {
        Some(ResponseType::RawGet) => Ok(Response::RawGet(decode_body("RawGet", payload)?)),
        Some(ResponseType::RawPut) => Ok(Response::RawPut(decode_body("RawPut", payload)?)),
        Some(ResponseType::RawDelete) => {
            Ok(Response::RawDelete(decode_body("RawDelete", payload)?))
        }
        Some(ResponseType::RawScan) => Ok(Response::RawScan(decode_body("RawScan", payload)?)),
        Some(ResponseType::Pong) => {
            expect_empty("Pong", payload)?;
            Ok(Response::Pong)
        }
        Some(ResponseType::Error) => Ok(Response::Error(
            String::from_utf8_lossy(payload).into_owned(),
        )),
        None => Err(KvError::Protocol(format!(
            "Unknown response type: 0x{:02x}",
            frame_type
        ))),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut len_bytes = &header[1..];
    let payload_len = len_bytes.get_u32();
    check_payload_len(payload_len)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len as usize];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete request from a stream
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    decode_request(&read_frame(reader)?)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
