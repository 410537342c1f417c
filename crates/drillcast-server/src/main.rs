//! Drillcast server binary.
//!
//! # Usage
//!
//! ```bash
//! # In-memory storage, self-signed certificate (development)
//! drillcast-server --bind 0.0.0.0:4433
//!
//! # Persistent storage, TLS, seeded roster (production)
//! drillcast-server --bind 0.0.0.0:4433 --cert cert.pem --key key.pem \
//!     --data drills.redb --roster students.csv
//! ```

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use drillcast_server::{
    DriverConfig, LogBridge, MemoryDirectory, MemoryStorage, RedbStorage, Server,
    ServerRuntimeConfig, roster,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// School drill-alert server
#[derive(Parser, Debug)]
#[command(name = "drillcast-server")]
#[command(about = "School drill-alert and notification server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:4433")]
    bind: SocketAddr,

    /// Path to TLS certificate (PEM format)
    #[arg(short, long)]
    cert: Option<PathBuf>,

    /// Path to TLS private key (PEM format)
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Path to the redb drill log (in-memory storage if omitted)
    #[arg(long)]
    data: Option<PathBuf>,

    /// CSV roster to seed the student directory from
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Maximum SMS sends in flight during one alert fan-out
    #[arg(long, default_value = "16")]
    sms_concurrency: usize,

    /// Maximum concurrent connections
    #[arg(long, default_value = "10000")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("drillcast server starting");

    if args.cert.is_none() || args.key.is_none() {
        tracing::warn!("no TLS certificate provided, using a self-signed certificate");
    }

    let directory = MemoryDirectory::new();
    if let Some(roster_path) = &args.roster {
        roster::seed(&directory, roster_path)?;
    }

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        cert_path: args.cert,
        key_path: args.key,
        sms_concurrency: args.sms_concurrency,
        driver: DriverConfig { max_connections: args.max_connections },
    };

    match args.data {
        Some(path) => {
            let storage = RedbStorage::open(&path)?;
            tracing::info!(path = %path.display(), "using redb storage");
            let server = Server::bind(config, storage, directory, Arc::new(LogBridge))?;
            server.run().await?;
        },
        None => {
            tracing::warn!("no --data path, drill history will not survive restart");
            let storage = MemoryStorage::new();
            let server = Server::bind(config, storage, directory, Arc::new(LogBridge))?;
            server.run().await?;
        },
    }

    Ok(())
}
