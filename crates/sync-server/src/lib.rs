// SPDX-License-Identifier: BUSL-1.1

pub mod config;
pub mod error;
pub mod model;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};

use config::ServerConfig;
use state::ServerState;

/// Build and serve the router until a termination signal arrives, then drain
/// in-flight connections before returning.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(ServerState::new(config));
    let router = transport::build_router(state.clone());

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "sync-server listening");

    let shutdown = state.shutdown.clone();
    tokio::spawn(wait_for_shutdown_signal(shutdown));

    axum::serve(listener, router).with_graceful_shutdown(state.shutdown.clone().cancelled_owned()).await?;

    Ok(())
}

async fn wait_for_shutdown_signal(shutdown: tokio_util::sync::CancellationToken) {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(sig) => sig,
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGINT handler");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigint.recv() => tracing::info!("received SIGINT"),
    }

    shutdown.cancel();
}
