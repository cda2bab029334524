// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;

use sync_protocol::Notification;

use crate::error::SyncError;
use crate::state::ServerState;
use crate::transport::auth::check_query_token;
use sync_protocol::SyncErrorCode;

/// `GET /ws/{id}/notify` — the per-process notification socket, substituting
/// for the original's per-process FIFO: one `Notification` message pushed
/// per firing the process participates in.
pub async fn ws_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    if !check_query_token(&state, params.get("token").map(String::as_str)) {
        return SyncError(SyncErrorCode::Unauthorized)
            .to_http_response("missing or invalid token")
            .into_response();
    }

    let process_id = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return SyncError(SyncErrorCode::BadRequest)
                .to_http_response("malformed process id")
                .into_response();
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    {
        let mut model = state.model.write().await;
        if let Err(err) = model.bind_notifier(&process_id, tx) {
            return err.to_http_response("no such process").into_response();
        }
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state, rx))
}

async fn handle_socket(
    mut socket: WebSocket,
    state: Arc<ServerState>,
    mut rx: mpsc::UnboundedReceiver<u64>,
) {
    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            maybe_index = rx.recv() => {
                let Some(transition_index) = maybe_index else { break };
                let payload = match serde_json::to_string(&Notification { transition_index }) {
                    Ok(payload) => payload,
                    Err(_) => continue,
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}
