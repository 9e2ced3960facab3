//! API command - runs the JSON API only

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::{bootstrap, build_socket_addr, shutdown_signal};
use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};

/// Run the API-only server
pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let state = crate::create_app_state_with_config(&config).await?;
    let app = with_metrics(create_router(state), &config);

    let addr = build_socket_addr(&config)?;
    info!("Starting API server on {}", addr);

    serve(app, addr).await?;

    info!("API server shutdown complete");
    Ok(())
}

/// Merge the Prometheus endpoint when metrics are enabled
pub(crate) fn with_metrics(router: Router, config: &AppConfig) -> Router {
    match init_metrics(&config.metrics) {
        Some(metrics) => router.merge(create_metrics_router(metrics, &config.metrics.path)),
        None => router,
    }
}

/// Serve until a shutdown signal arrives. Peer addresses feed the rate limiter.
pub(crate) async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
