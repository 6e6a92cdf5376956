//! Search service host binary.
//!
//! Reads configuration from the environment (and `.env`), builds the
//! search pipeline and serves it over HTTP until interrupted.

use std::sync::Arc;

use engage::{Server, ServerConfig};
use engage_search::SearchService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.default_log_filter())),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        enhancement = config.search.enhancement.enabled,
        "engage-host starting"
    );

    let service = SearchService::new(config.search.clone()).map_err(|e| {
        tracing::error!(error = %e, "failed to build search service");
        anyhow::anyhow!("engage-host failed: {e}")
    })?;
    if service.is_mock() {
        tracing::warn!("MASA_API_KEY not set, serving mock data");
    }

    let server = Server::start(Arc::new(service), &config).await?;
    tracing::info!("listening on http://{}", server.addr());

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    tracing::info!("engage-host shut down cleanly");
    Ok(())
}
