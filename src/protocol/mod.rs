//! Protocol Module
//!
//! Defines the raw API messages and the wire protocol that carries them.
//!
//! ## Frame Format (V1 - Simple Binary)
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Type (1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Requests
//! - 0x01: RAW_GET     - Payload: bincode(RawGetRequest)
//! - 0x02: RAW_PUT     - Payload: bincode(RawPutRequest)
//! - 0x03: RAW_DELETE  - Payload: bincode(RawDeleteRequest)
//! - 0x04: RAW_SCAN    - Payload: bincode(RawScanRequest)
//! - 0x05: PING        - Payload: empty
//!
//! ### Responses
//! - 0x81..0x84: matching raw response, bincode payload
//! - 0x85: PONG  - Payload: empty
//! - 0xFF: ERROR - Payload: UTF-8 message

mod codec;
mod context;
mod messages;
mod request;
mod response;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use context::{Context, Peer, RegionEpoch};
pub use messages::{
    KvPair, RawDeleteRequest, RawDeleteResponse, RawGetRequest, RawGetResponse, RawPutRequest,
    RawPutResponse, RawScanRequest, RawScanResponse,
};
pub use request::{Request, RequestType};
pub use response::{Response, ResponseType};
