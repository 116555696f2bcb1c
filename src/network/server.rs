//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::api::RawApi;
use crate::config::Config;
use crate::error::{KvError, Result};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Queued connections per worker before the acceptor blocks
const QUEUE_DEPTH_PER_WORKER: usize = 4;

/// TCP server for the raw API
pub struct Server {
    config: Config,
    api: RawApi,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
}

/// Cloneable handle that stops a running [`Server`]
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stop accepting; workers exit once their current client disconnects
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Server {
    /// Create a new server with the given config and request handlers
    pub fn new(config: Config, api: RawApi) -> Self {
        Self {
            config,
            api,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listen address (idempotent); returns the bound address
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            KvError::Network(format!("bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);

        tracing::info!("Listening on {}", addr);
        Ok(addr)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Start the server (blocking until shutdown)
    ///
    /// After [`ShutdownHandle::shutdown`] the acceptor stops at once, but
    /// `run` only returns when every worker is idle: each open connection
    /// must disconnect or hit `read_timeout_ms` first. With a read timeout
    /// of 0 an idle client keeps `run` blocked indefinitely.
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;
        self.bind()?;
        let listener = self
            .listener
            .take()
            .ok_or_else(|| KvError::Network("listener not bound".to_string()))?;

        let workers = self.config.worker_threads;
        let (tx, rx) = channel::bounded::<TcpStream>(workers * QUEUE_DEPTH_PER_WORKER);

        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| {
                let rx = rx.clone();
                let api = self.api.clone();
                let config = self.config.clone();
                thread::Builder::new()
                    .name(format!("rawkv-worker-{}", id))
                    .spawn(move || worker_loop(rx, api, config))
            })
            .collect::<std::io::Result<_>>()?;
        drop(rx);

        tracing::info!("Server started with {} workers", workers);

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    tracing::trace!("Accepted connection from {}", peer);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    if tx.send(stream).is_err() {
                        tracing::error!("All workers exited; stopping acceptor");
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Shutting down; waiting for workers");
        drop(tx);
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }
}

fn worker_loop(rx: Receiver<TcpStream>, api: RawApi, config: Config) {
    for stream in rx.iter() {
        let mut connection = match Connection::new(stream, api.clone()) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to set up connection: {}", e);
                continue;
            }
        };

        if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
            tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        }

        if let Err(e) = connection.handle() {
            tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
        }
    }
}
