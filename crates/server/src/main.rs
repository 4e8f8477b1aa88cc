//! offramp server entry point.
//!
//! Boots the hosting proxy: loads configuration, opens the partition store,
//! runs the coordinator's install/activate lifecycle, and serves HTTP.
//! Logging goes to stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use offramp_client::{OriginClient, OriginConfig};
use offramp_core::{CacheDb, Coordinator, CoordinatorConfig};

mod error;
mod handler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = CoordinatorConfig::load()?;
    tracing::info!(version = %config.version_tag, origin = %config.origin_url, "starting offramp");

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(OriginClient::new(OriginConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        ..Default::default()
    })?);

    let listen_addr = config.listen_addr.clone();
    let coordinator = Arc::new(Coordinator::new(config, db, network));

    // Install failure means the new version never takes over: skip the
    // activation sweep and keep serving whatever partitions already exist.
    match coordinator.install().await {
        Ok(()) => coordinator.activate().await?,
        Err(err) => {
            tracing::error!(error = %err, "install failed; previous cache version stays in control");
        }
    }

    let app = handler::router(coordinator);
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "offramp serving");
    axum::serve(listener, app).await?;

    Ok(())
}
