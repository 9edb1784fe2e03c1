//! nammy-sw entry point.
//!
//! Boots the offline worker (install, activate) and serves its event entry
//! points as MCP tools on stdio. Logging goes to stderr to avoid interfering
//! with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use nammy_client::{FetchConfig, HttpFetcher, ServiceWorker};
use nammy_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        origin = %config.origin,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "Starting nammy-sw on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await.context("opening cache database")?;
    let fetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
    let worker = Arc::new(ServiceWorker::new(config, db.clone(), fetcher)?);

    match worker.start().await {
        Ok(state) => tracing::info!(%state, "worker started"),
        Err(e) => tracing::error!(error = %e, "worker failed to start; serving pass-through"),
    }

    let handler = handler::NammyServer::new(worker, db);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
