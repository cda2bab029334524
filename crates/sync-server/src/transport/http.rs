// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use sync_protocol::{
    HealthResponse, RegisterProcessRequest, RegisterProcessResponse, SyncErrorCode,
    UpdateSensitivitiesRequest,
};

use crate::error::SyncError;
use crate::model::ProcessId;
use crate::state::ServerState;

fn parse_process_id(raw: &str) -> Result<ProcessId, SyncError> {
    raw.parse().map_err(|_| SyncError(SyncErrorCode::BadRequest))
}

pub async fn health(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let model = state.model.read().await;
    Json(HealthResponse {
        status: "ok".to_owned(),
        process_count: model.process_count(),
        transition_count: model.transition_count(),
    })
}

/// `POST /api/v1/processes` — §4.1.1 `alphabet`.
pub async fn register_process(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<RegisterProcessRequest>,
) -> impl IntoResponse {
    let mut model = state.model.write().await;
    match model.register_process(&req.prefix, &req.actions, None) {
        Ok((process_id, indices)) => {
            tracing::info!(
                process_id = %process_id,
                prefix = %req.prefix,
                nr_actions = req.actions.len(),
                "process registered"
            );
            Json(RegisterProcessResponse { process_id: process_id.to_string(), indices })
                .into_response()
        }
        Err(err) => {
            tracing::warn!(prefix = %req.prefix, %err, "alphabet registration rejected");
            err.to_http_response(err.to_string()).into_response()
        }
    }
}

/// `POST /api/v1/processes/{id}/sensitivities` — §4.1.2 `update_sensitivities`.
pub async fn update_sensitivities(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSensitivitiesRequest>,
) -> impl IntoResponse {
    let process_id = match parse_process_id(&id) {
        Ok(id) => id,
        Err(err) => return err.to_http_response("malformed process id").into_response(),
    };

    let mut model = state.model.write().await;
    match model.update_sensitivities(&process_id, &req.sensitivities) {
        Ok(()) => {
            tracing::debug!(process_id = %process_id, "sensitivities updated");
            Json(serde_json::json!({})).into_response()
        }
        Err(err) => {
            tracing::warn!(process_id = %process_id, %err, "sensitivity update rejected");
            err.to_http_response(err.to_string()).into_response()
        }
    }
}

/// `POST /api/v1/transitions/{index}/synchronise` — §4.1.3 `synchronise`.
pub async fn synchronise(
    State(state): State<Arc<ServerState>>,
    Path(index): Path<u64>,
) -> impl IntoResponse {
    let mut model = state.model.write().await;
    match model.synchronise(index) {
        Ok(()) => {
            tracing::info!(transition_index = index, "transition synchronised");
            Json(serde_json::json!({})).into_response()
        }
        Err(err) => {
            tracing::warn!(transition_index = index, %err, "synchronise rejected");
            err.to_http_response(err.to_string()).into_response()
        }
    }
}

/// `DELETE /api/v1/processes/{id}` — §4.1.4 `delete`.
pub async fn delete_process(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let process_id = match parse_process_id(&id) {
        Ok(id) => id,
        Err(err) => return err.to_http_response("malformed process id").into_response(),
    };

    let mut model = state.model.write().await;
    match model.delete_process(&process_id) {
        Ok(()) => {
            tracing::info!(process_id = %process_id, "process deleted");
            Json(serde_json::json!({})).into_response()
        }
        Err(err) => {
            tracing::warn!(process_id = %process_id, %err, "delete rejected");
            err.to_http_response(err.to_string()).into_response()
        }
    }
}
