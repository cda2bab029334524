// SPDX-License-Identifier: BUSL-1.1

pub mod auth;
pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::ServerState;

pub fn build_router(state: Arc<ServerState>) -> Router {
    // The header-based `auth_layer` guards every plain HTTP route. The
    // notification socket is excluded from it and checks its own token via
    // query parameter instead, inside `ws::ws_handler` — a WebSocket
    // handshake cannot always carry a custom header.
    let authenticated = Router::new()
        .route("/api/v1/processes", post(http::register_process))
        .route("/api/v1/processes/{id}", delete(http::delete_process))
        .route("/api/v1/processes/{id}/sensitivities", post(http::update_sensitivities))
        .route("/api/v1/transitions/{index}/synchronise", post(http::synchronise))
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer));

    Router::new()
        .route("/api/v1/health", get(http::health))
        .route("/ws/{id}/notify", get(ws::ws_handler))
        .merge(authenticated)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
