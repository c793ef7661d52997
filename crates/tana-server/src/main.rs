mod db;
mod error;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tana_core::config::AppConfig;

use crate::db::DbHandle;
use crate::routes::AppState;

#[derive(Debug, Parser)]
#[command(name = "tana-server", version, about = "REST backend for the tana anime library")]
struct Args {
    /// Config file to load instead of the platform config path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port; overrides the config file.
    #[arg(long)]
    port: Option<u16>,

    /// Path to the SQLite database; overrides the config file.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory served under /media; overrides the config file.
    #[arg(long)]
    media_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tana=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db) = args.db {
        config.server.database = Some(db);
    }
    if let Some(media_root) = args.media_root {
        config.media.root = media_root;
    }

    let db_path = config.ensure_db_path()?;
    let db = DbHandle::open(&db_path).ok_or("failed to open database")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState {
        db,
        media_root: config.media.root,
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, db = %db_path.display(), "listening");

    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
