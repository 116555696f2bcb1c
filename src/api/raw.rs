//! Raw API
//!
//! Non-transactional, single-key get/put/delete and range scan.

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{
    KvPair, RawDeleteRequest, RawDeleteResponse, RawGetRequest, RawGetResponse, RawPutRequest,
    RawPutResponse, RawScanRequest, RawScanResponse, Request, Response,
};
use crate::storage::{Modify, Storage};

/// Raw request handlers over a shared storage
///
/// Holds no mutable state of its own; handlers may run concurrently.
/// Every reader and iterator acquired by a handler is dropped before the
/// handler returns, on success and on error.
#[derive(Clone)]
pub struct RawApi {
    storage: Arc<dyn Storage>,
}

impl RawApi {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The storage requests are served from
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Point lookup
    ///
    /// A missing key is reported through `not_found`, not as an error.
    pub fn raw_get(&self, req: RawGetRequest) -> Result<RawGetResponse> {
        let reader = self.storage.reader(&req.context)?;
        let value = reader.get_cf(&req.cf, &req.key)?;

        tracing::debug!("raw_get cf={} found={}", req.cf, value.is_some());

        Ok(match value {
            Some(value) => RawGetResponse {
                value,
                not_found: false,
            },
            None => RawGetResponse {
                value: Vec::new(),
                not_found: true,
            },
        })
    }

    /// Store a single key as a one-entry batch
    pub fn raw_put(&self, req: RawPutRequest) -> Result<RawPutResponse> {
        let RawPutRequest {
            context,
            cf,
            key,
            value,
        } = req;

        tracing::debug!("raw_put cf={} key_len={} value_len={}", cf, key.len(), value.len());
        self.storage
            .write(&context, vec![Modify::Put { cf, key, value }])?;

        Ok(RawPutResponse {})
    }

    /// Remove a single key; deleting a missing key succeeds
    pub fn raw_delete(&self, req: RawDeleteRequest) -> Result<RawDeleteResponse> {
        let RawDeleteRequest { context, cf, key } = req;

        tracing::debug!("raw_delete cf={} key_len={}", cf, key.len());
        self.storage.write(&context, vec![Modify::Delete { cf, key }])?;

        Ok(RawDeleteResponse {})
    }

    /// Up to `limit` pairs with key >= `start_key`, in key order
    ///
    /// A failure part way through discards everything collected so far.
    pub fn raw_scan(&self, req: RawScanRequest) -> Result<RawScanResponse> {
        if req.limit == 0 {
            return Ok(RawScanResponse::default());
        }

        let reader = self.storage.reader(&req.context)?;
        // Declared after `reader`, so dropped (released) before it
        let mut iter = reader.iter_cf(&req.cf)?;
        iter.seek(&req.start_key)?;

        let mut kvs = Vec::new();
        while kvs.len() < req.limit as usize && iter.valid() {
            let key = iter.key()?.to_vec();
            let value = iter.value()?;
            kvs.push(KvPair { key, value });
            iter.next()?;
        }

        tracing::debug!("raw_scan cf={} limit={} returned={}", req.cf, req.limit, kvs.len());
        Ok(RawScanResponse { kvs })
    }

    /// Route a decoded request to its handler
    ///
    /// Handler errors become `Response::Error`.
    pub fn handle(&self, request: Request) -> Response {
        let result = match request {
            Request::RawGet(req) => self.raw_get(req).map(Response::RawGet),
            Request::RawPut(req) => self.raw_put(req).map(Response::RawPut),
            Request::RawDelete(req) => self.raw_delete(req).map(Response::RawDelete),
            Request::RawScan(req) => self.raw_scan(req).map(Response::RawScan),
            Request::Ping => Ok(Response::Pong),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!("request failed: {}", e);
            Response::error(e.to_string())
        })
    }
}
