// SPDX-License-Identifier: BUSL-1.1

use axum::http::StatusCode;
use axum::Json;

use sync_protocol::{ErrorResponse, SyncErrorCode};

/// Server-side error, one variant per §7 error kind in the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncError(pub SyncErrorCode);

impl SyncError {
    pub fn code(self) -> SyncErrorCode {
        self.0
    }

    pub fn to_http_response(self, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_response(message)))
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl std::error::Error for SyncError {}
