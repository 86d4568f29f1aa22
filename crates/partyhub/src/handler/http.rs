//! HTTP endpoints for creating and joining rooms.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use partyhub_protocol::{RoomId, UserId};
use partyhub_store::Gateway;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Response of `POST /room`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub user_id: String,
}

/// Body of `POST /room/join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: String,
}

/// Response of `POST /room/join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub user_id: String,
}

/// Health check.
pub async fn ping() -> &'static str {
    "pong"
}

/// Creates a room together with its first user.
pub async fn create_room<G: Gateway>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<CreateRoomResponse>, ApiError> {
    let room_id = RoomId::new(Uuid::new_v4().to_string());
    let user_id = UserId::new(Uuid::new_v4().to_string());

    state.gateway.create_room(&room_id).await?;
    state.gateway.add_user(&user_id, &room_id).await?;

    Ok(Json(CreateRoomResponse {
        room_id: room_id.to_string(),
        user_id: user_id.to_string(),
    }))
}

/// Issues a new user for an existing room.
pub async fn join_room<G: Gateway>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let room_id = RoomId::new(req.room_id);
    if !state.gateway.room_exists(&room_id).await? {
        return Err(ApiError::RoomNotFound(room_id));
    }

    let user_id = UserId::new(Uuid::new_v4().to_string());
    state.gateway.add_user(&user_id, &room_id).await?;

    Ok(Json(JoinRoomResponse {
        user_id: user_id.to_string(),
    }))
}
