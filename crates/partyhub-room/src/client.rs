//! A connected client as seen by the registry and the hub.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use partyhub_protocol::UserId;
use tokio::sync::mpsc;

use crate::RoomError;

/// One encoded text frame. Encoded once per event and shared by every
/// recipient.
pub type Frame = Arc<str>;

/// Channel feeding a connection's writer task.
pub type ClientSender = mpsc::UnboundedSender<Frame>;

/// Process-unique identifier of one WebSocket connection.
///
/// A user who reconnects gets a new id, so removing the old connection
/// can never take the new one down with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

impl ConnectionId {
    /// Creates a `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates a fresh id from the process-wide counter.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A registered participant: who they are and where to send their frames.
///
/// Cloning a `Client` clones the sender, not the connection; registry
/// snapshots hand out clones.
#[derive(Debug, Clone)]
pub struct Client {
    user_id: UserId,
    conn_id: ConnectionId,
    sender: ClientSender,
}

impl Client {
    /// Wraps `sender` under a freshly allocated [`ConnectionId`].
    pub fn new(user_id: UserId, sender: ClientSender) -> Self {
        Self {
            user_id,
            conn_id: ConnectionId::next(),
            sender,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Queues a frame for this client's writer task.
    ///
    /// # Errors
    /// `RoomError::ClientGone` if the writer has already shut down.
    pub fn send(&self, frame: Frame) -> Result<(), RoomError> {
        self.sender
            .send(frame)
            .map_err(|_| RoomError::ClientGone(self.conn_id))
    }

    /// Whether the writer side has hung up.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(b.into_inner() > a.into_inner());
    }

    #[test]
    fn test_send_reaches_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = Client::new(UserId::new("alice"), tx);
        client.send(Frame::from("hello")).unwrap();
        assert_eq!(&*rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_send_after_receiver_dropped_is_client_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Client::new(UserId::new("alice"), tx);
        drop(rx);
        assert!(client.is_closed());
        let err = client.send(Frame::from("hello")).unwrap_err();
        assert!(matches!(err, RoomError::ClientGone(id) if id == client.conn_id()));
    }
}
