//! Error types for the room layer.

use partyhub_protocol::ProtocolError;

use crate::ConnectionId;

/// Errors that can occur during registry or hub operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The actor behind a handle has stopped.
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    /// The client's outbound channel is closed (its writer task is gone).
    #[error("client {0} is gone")]
    ClientGone(ConnectionId),

    /// The event could not be encoded for delivery.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
