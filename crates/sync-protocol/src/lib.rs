//! Wire-format types shared between `sync-server` and `fsm-client`.
//!
//! This is the canonical source for the request/reply shapes of the
//! synchronisation protocol, used by both the server and the client binary —
//! mirrors how the teacher factors `MuxEvent` into a module shared by its
//! server and CLI crates instead of duplicating it on each side.

use serde::{Deserialize, Serialize};

/// `POST /api/v1/processes` request body.
///
/// `actions` is the process's alphabet in first-seen order; slot *i* of the
/// reply's `indices` is the global transition index assigned to `actions[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProcessRequest {
    pub prefix: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProcessResponse {
    pub process_id: String,
    pub indices: Vec<u64>,
}

/// `POST /api/v1/processes/{id}/sensitivities` request body.
///
/// One boolean per slot of the process's alphabet, in the same order as the
/// `actions` it registered with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSensitivitiesRequest {
    pub sensitivities: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub process_count: usize,
    pub transition_count: usize,
}

/// Pushed once per firing over a process's notification socket — the
/// WebSocket substitute for the original's per-process FIFO payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Notification {
    pub transition_index: u64,
}

/// Error codes returned by the synchronisation server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncErrorCode {
    Unauthorized,
    BadRequest,
    UnknownProcess,
    UnknownTransition,
    DuplicateAlphabet,
    DuplicateAction,
    LengthMismatch,
    NotQuiescent,
    NotSensitive,
    NotificationFailed,
    Internal,
}

impl SyncErrorCode {
    pub fn http_status(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::BadRequest
            | Self::DuplicateAlphabet
            | Self::DuplicateAction
            | Self::LengthMismatch => 400,
            Self::UnknownProcess | Self::UnknownTransition => 404,
            Self::NotQuiescent | Self::NotSensitive => 409,
            Self::NotificationFailed => 502,
            Self::Internal => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::UnknownProcess => "UNKNOWN_PROCESS",
            Self::UnknownTransition => "UNKNOWN_TRANSITION",
            Self::DuplicateAlphabet => "DUPLICATE_ALPHABET",
            Self::DuplicateAction => "DUPLICATE_ACTION",
            Self::LengthMismatch => "LENGTH_MISMATCH",
            Self::NotQuiescent => "NOT_QUIESCENT",
            Self::NotSensitive => "NOT_SENSITIVE",
            Self::NotificationFailed => "NOTIFICATION_FAILED",
            Self::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl SyncErrorCode {
    pub fn to_response(self, message: impl Into<String>) -> ErrorResponse {
        ErrorResponse { error: ErrorBody { code: self.as_str().to_owned(), message: message.into() } }
    }
}
