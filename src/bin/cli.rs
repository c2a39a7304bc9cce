//! caskdb CLI
//!
//! Command-line interface for a local caskdb store: opens the store in a
//! data directory, runs one operation, and closes it again.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use caskdb::{CaskError, Config, Engine, SyncPolicy};

/// caskdb CLI
#[derive(Parser, Debug)]
#[command(name = "caskdb")]
#[command(about = "CLI for the caskdb key-value store", version = caskdb::VERSION)]
struct Args {
    /// Data directory holding the log and snapshot files
    #[arg(short, long, default_value = "./caskdb_data")]
    dir: std::path::PathBuf,

    /// fsync the log after every write
    #[arg(long)]
    sync_every_write: bool,

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
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Print live keys and log size
    Stats,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CaskError::KeyNotFound) => {
            eprintln!("key not found");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> caskdb::Result<()> {
    std::fs::create_dir_all(&args.dir)?;

    let sync_policy = if args.sync_every_write {
        SyncPolicy::EveryWrite
    } else {
        SyncPolicy::OnClose
    };
    let config = Config::builder()
        .log_path(args.dir.join("cask.log"))
        .snapshot_path(args.dir.join("cask.idx"))
        .sync_policy(sync_policy)
        .build();

    let mut engine = Engine::open(config)?;

    let result = match &args.command {
        Commands::Get { key } => match engine.get(key.as_bytes())? {
            Some(value) => {
                println!("{}", String::from_utf8_lossy(&value));
                Ok(())
            }
            None => Err(CaskError::KeyNotFound),
        },
        Commands::Set { key, value } => engine.set(key.as_bytes(), value.as_bytes()),
        Commands::Del { key } => engine.delete(key.as_bytes()),
        Commands::Stats => {
            println!("live keys: {}", engine.len());
            println!("log bytes: {}", engine.log_len());
            for key in engine.keys() {
                println!("  {}", String::from_utf8_lossy(key));
            }
            Ok(())
        }
    };

    // close even when the operation failed, so the snapshot stays current
    let close_result = engine.close();
    result.and(close_result)
}
