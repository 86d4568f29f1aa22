//! Error types for the persistence layer.

use partyhub_protocol::{RoomId, UserId};

/// Errors a [`Gateway`](crate::Gateway) call can return.
///
/// Callers treat every variant the same way (the game suspends, a point
/// submission is dropped); the variants exist so logs say *why*.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The room has no record in the store.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The user is not registered as a participant of the room's game.
    #[error("user {user_id} is not a participant in room {room_id}")]
    ParticipantNotFound { room_id: RoomId, user_id: UserId },

    /// A record with this key already exists.
    #[error("{0} already exists")]
    Duplicate(String),

    /// Adding the delta would overflow the stored score.
    #[error("score overflow for user {user_id} in room {room_id}")]
    ScoreOverflow { room_id: RoomId, user_id: UserId },

    /// The backing store could not be reached or rejected the query.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
