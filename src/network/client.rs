//! Blocking client
//!
//! One request in flight per connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::protocol::{
    read_response, write_request, Context, KvPair, RawDeleteRequest, RawGetRequest,
    RawPutRequest, RawScanRequest, Request, Response,
};

/// Client for a rawkv server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    /// Sent with every request
    context: Context,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| KvError::Network(format!("connect: {}", e)))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            context: Context::default(),
        })
    }

    /// Use `context` for subsequent requests
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Bound how long a call waits for the response
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send one request and wait for its response
    ///
    /// Error frames are returned as `KvError::Remote`.
    pub fn call(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        match read_response(&mut self.reader)? {
            Response::Error(message) => Err(KvError::Remote(message)),
            response => Ok(response),
        }
    }

    /// `Ok(None)` when the key is absent
    pub fn raw_get(&mut self, cf: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let request = Request::RawGet(RawGetRequest {
            context: self.context.clone(),
            cf: cf.to_string(),
            key: key.to_vec(),
        });

        match self.call(&request)? {
            Response::RawGet(resp) if resp.not_found => Ok(None),
            Response::RawGet(resp) => Ok(Some(resp.value)),
            other => Err(unexpected("RawGet", &other)),
        }
    }

    pub fn raw_put(&mut self, cf: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let request = Request::RawPut(RawPutRequest {
            context: self.context.clone(),
            cf: cf.to_string(),
            key: key.to_vec(),
            value: value.to_vec(),
        });

        match self.call(&request)? {
            Response::RawPut(_) => Ok(()),
            other => Err(unexpected("RawPut", &other)),
        }
    }

    pub fn raw_delete(&mut self, cf: &str, key: &[u8]) -> Result<()> {
        let request = Request::RawDelete(RawDeleteRequest {
            context: self.context.clone(),
            cf: cf.to_string(),
            key: key.to_vec(),
        });

        match self.call(&request)? {
            Response::RawDelete(_) => Ok(()),
            other => Err(unexpected("RawDelete", &other)),
        }
    }

    pub fn raw_scan(&mut self, cf: &str, start_key: &[u8], limit: u32) -> Result<Vec<KvPair>> {
        let request = Request::RawScan(RawScanRequest {
            context: self.context.clone(),
            cf: cf.to_string(),
            start_key: start_key.to_vec(),
            limit,
        });

        match self.call(&request)? {
            Response::RawScan(resp) => Ok(resp.kvs),
            other => Err(unexpected("RawScan", &other)),
        }
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        match self.call(&Request::Ping)? {
            Response::Pong => Ok(()),
            other => Err(unexpected("Ping", &other)),
        }
    }
}

fn unexpected(request: &str, response: &Response) -> KvError {
    KvError::Protocol(format!(
        "{} answered with {:?} frame",
        request,
        response.response_type()
    ))
}
