//! Liveness endpoint for external uptime monitoring

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tracing::info;

/// Liveness server configuration
pub struct LivenessConfig {
    pub port: u16,
}

pub fn liveness_router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

/// Serve the liveness endpoint until the process exits
pub async fn start_liveness_server(config: LivenessConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind liveness endpoint on {}: {}", addr, e))?;

    info!("Liveness endpoint listening on http://{}", addr);
    axum::serve(listener, liveness_router()).await?;

    Ok(())
}

async fn health() -> &'static str {
    "I'm alive"
}
