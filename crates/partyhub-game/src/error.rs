//! Error types for game sessions.

use partyhub_protocol::RoomId;
use partyhub_room::RoomError;
use partyhub_store::StoreError;

/// Errors raised while starting or running a game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A session for this room is still starting or running.
    #[error("a game is already running in room {0}")]
    AlreadyRunning(RoomId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Room(#[from] RoomError),
}
