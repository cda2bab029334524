// SPDX-License-Identifier: BUSL-1.1

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::model::ServerModel;

/// Shared server state, handed to every handler behind `Arc`.
///
/// A single `RwLock` around the whole model (rather than per-table locks)
/// preserves the quiescence and ordering invariants across `synchronise`
/// without a separate coordination protocol — mirrors the teacher's single
/// `RwLock<HashMap<...>>` around `MuxState::sessions`.
pub struct ServerState {
    pub model: RwLock<ServerModel>,
    pub config: ServerConfig,
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self { model: RwLock::new(ServerModel::new()), config, shutdown: CancellationToken::new() }
    }
}
