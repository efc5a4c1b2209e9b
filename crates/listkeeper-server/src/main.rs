use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use listkeeper_server::config::ServerConfig;
use listkeeper_service::LocalService;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let db = listkeeper_db::connect(&config.db_config()).await?;
    let store = listkeeper_store::create_store(&config.store_config());
    let service = Arc::new(LocalService::new(db, store, config.timeout()));

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, timeout = ?config.timeout(), "listkeeper-server listening");

    listkeeper_server::serve(listener, service).await?;
    Ok(())
}
