//! Unified error type for the partyhub server, plus the JSON rejections
//! its HTTP endpoints return.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use partyhub_game::GameError;
use partyhub_protocol::{ProtocolError, RoomId, UserId};
use partyhub_room::RoomError;
use partyhub_store::StoreError;
use serde::{Deserialize, Serialize};

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PartyHubError {
    /// Binding or serving the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// JSON body of every error response: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// A request the HTTP layer refuses before doing any work.
///
/// The WebSocket endpoint returns these instead of upgrading, so a
/// browser sees a status code and a readable message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("room not found")]
    RoomNotFound(RoomId),

    #[error("user is not a member of this room")]
    UserNotInRoom { room_id: RoomId, user_id: UserId },

    #[error("storage error")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::UserNotInRoom { .. } => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::RoomNotFound(room_id) => tracing::info!(%room_id, "rejected: room not found"),
            Self::UserNotInRoom { room_id, user_id } => {
                tracing::info!(%room_id, %user_id, "rejected: user not in room")
            }
            Self::Store(e) => tracing::error!(error = %e, "store call failed"),
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
