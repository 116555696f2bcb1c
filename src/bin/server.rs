//! rawkv Server Binary
//!
//! Starts the TCP server for the raw API.

use std::sync::Arc;

use clap::Parser;
use rawkv::network::Server;
use rawkv::{Config, MemStorage, RawApi, StandaloneStorage, Storage};
use tracing_subscriber::{fmt, EnvFilter};

/// rawkv Server
#[derive(Parser, Debug)]
#[command(name = "rawkv-server")]
#[command(about = "Raw key-value server over column families")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./rawkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:20160")]
    listen: String,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// WAL size in MB that triggers a checkpoint
    #[arg(long, default_value = "64")]
    wal_mb: u64,

    /// Keep everything in memory (no WAL, no checkpoints)
    #[arg(long)]
    in_memory: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rawkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("rawkv server v{}", rawkv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .wal_size_limit(args.wal_mb * 1024 * 1024)
        .build();

    let storage: Arc<dyn Storage> = if args.in_memory {
        tracing::info!("Using in-memory storage");
        match MemStorage::new(&config) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                tracing::error!("Invalid configuration: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!("Data directory: {}", args.data_dir);
        match StandaloneStorage::open(config.clone()) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                tracing::error!("Failed to open storage: {}", e);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = storage.start() {
        tracing::error!("Failed to start storage: {}", e);
        std::process::exit(1);
    }

    let mut server = Server::new(config, RawApi::new(Arc::clone(&storage)));
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = storage.stop() {
        tracing::error!("Failed to stop storage cleanly: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
