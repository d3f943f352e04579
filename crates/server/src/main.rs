//! mcp-harbor server entry point.
//!
//! This is the main binary that boots the worker and serves its events as MCP
//! tools on stdio transport. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use harbor_client::{FetchClient, FetchConfig};
use harbor_core::{AppConfig, MemoryStore, Policy, ResponseStore, SqliteStore, Worker, WorkerContext};

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

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, generation = %config.generation, "Starting mcp-harbor server on stdio transport");

    let store: Arc<dyn ResponseStore> = match &config.db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using SQLite response store");
            Arc::new(SqliteStore::open(path).await?)
        }
        None => {
            tracing::info!("using in-memory response store");
            Arc::new(MemoryStore::new())
        }
    };

    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(Worker::new(Policy::from_config(&config)?, WorkerContext::new(store, network)));

    match worker.start().await {
        Ok(status) => tracing::info!(state = %status.state, generation = %status.generation, "worker started"),
        Err(e) => tracing::warn!(error = %e, "worker did not start; retry with harbor_lifecycle"),
    }

    let handler = handler::HarborServer::new(worker.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    worker.context().background.settle().await;

    Ok(())
}
