//! Serve command - runs the API and the web client on the same port

use tracing::info;

use super::api::{serve, with_metrics};
use super::{bootstrap, build_socket_addr};
use crate::api::create_router_with_ui;

/// Run the combined API + web client server
pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let state = crate::create_app_state_with_config(&config).await?;
    let app = with_metrics(
        create_router_with_ui(state, &config.server.static_dir),
        &config,
    );

    let addr = build_socket_addr(&config)?;
    info!(static_dir = %config.server.static_dir, "Starting server (API + UI) on {}", addr);

    serve(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}
