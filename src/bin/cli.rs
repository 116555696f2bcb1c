//! rawkv CLI Client
//!
//! Command-line interface for interacting with a rawkv server.

use clap::{Parser, Subcommand};
use rawkv::network::Client;
use rawkv::storage::CF_DEFAULT;

/// rawkv CLI
#[derive(Parser, Debug)]
#[command(name = "rawkv-cli")]
#[command(about = "CLI for the rawkv raw API")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:20160")]
    server: String,

    /// Column family
    #[arg(long, default_value = CF_DEFAULT)]
    cf: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// List up to LIMIT pairs starting at START
    Scan {
        /// First key (inclusive)
        #[arg(default_value = "")]
        start: String,

        /// Maximum number of pairs
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> rawkv::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => match client.raw_get(&args.cf, key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(not found)"),
        },
        Commands::Put { key, value } => {
            client.raw_put(&args.cf, key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Delete { key } => {
            client.raw_delete(&args.cf, key.as_bytes())?;
            println!("OK");
        }
        Commands::Scan { start, limit } => {
            for pair in client.raw_scan(&args.cf, start.as_bytes(), limit)? {
                println!(
                    "{} => {}",
                    String::from_utf8_lossy(&pair.key),
                    String::from_utf8_lossy(&pair.value)
                );
            }
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}
