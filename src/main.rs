//! EntrySense Registrar daemon
//!
//! Serves the registration API over HTTP, backed by the two SQLite stores.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults
//! entrysense-registrar
//!
//! # Start with custom config
//! entrysense-registrar --config /path/to/config.toml
//!
//! # Start with custom port or data directory
//! entrysense-registrar --http-port 8071 --data-dir /var/lib/entrysense
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use entrysense_registrar::{AccessDb, Config, HttpServer, IdentityDb, Registrar};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "entrysense-registrar")]
#[command(about = "Dual-store RFID credential registrar")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory holding both store files
    #[arg(long, env = "ENTRYSENSE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, env = "ENTRYSENSE_HTTP_PORT")]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("entrysense_registrar=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        Config::load(config_path)?
    } else {
        Config::default()
    };

    // Apply CLI overrides
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(port) = args.http_port {
        config.http_port = port;
    }

    std::fs::create_dir_all(&config.data_dir)?;

    let identity_db = Arc::new(IdentityDb::open(&config.identity_db())?);
    let access_db = Arc::new(AccessDb::open(&config.access_db())?);
    let registrar = Arc::new(Registrar::new(identity_db.clone(), access_db.clone()));

    let bind_addr: SocketAddr = ([0, 0, 0, 0], config.http_port).into();
    info!(
        identity_db = ?config.identity_db(),
        access_db = ?config.access_db(),
        "Starting registrar"
    );

    let server = Arc::new(HttpServer::new(
        registrar,
        identity_db,
        access_db,
        bind_addr,
    ));
    server.run().await?;

    Ok(())
}
