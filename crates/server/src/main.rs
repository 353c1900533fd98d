//! unmessify server entry point.
//!
//! Opens the cache, registers the offline worker for the configured version,
//! then serves MCP on stdio. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use unmessify_client::{Dispatcher, Scope, Worker};
use unmessify_core::{AppConfig, CacheDb, Caches};

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
    tracing::info!(origin = %config.origin, version = %config.cache_version, "Starting unmessify server on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let storage = Arc::new(db);
    let caches = Caches::new(storage.clone());
    let scope = Scope::new(&config.origin)?;

    let worker = Worker::from_config(&config, storage)?;
    let (dispatcher, _worker_task) = Dispatcher::spawn_default(Arc::new(worker));

    let (installed, evicted) = dispatcher.start().await?;
    tracing::info!(
        cached = installed.cached.len(),
        failed = installed.failed.len(),
        evicted = evicted.deleted.len(),
        "worker active"
    );

    let ctx = tools::ToolContext { dispatcher, caches, scope, version: config.cache_version.clone() };
    let handler = handler::UnmessifyServer::new(ctx);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
