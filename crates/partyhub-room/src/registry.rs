//! Room registry actor: the only owner of room membership.
//!
//! Every mutation and every read goes through one Tokio task that holds
//! the `room id → clients` map. Callers talk to it through a
//! [`RegistryHandle`], sending a command and awaiting the reply on a
//! `oneshot` channel. Because commands are processed one at a time, a
//! snapshot always reflects every registration whose reply was received
//! before the snapshot was requested.

use std::collections::HashMap;

use partyhub_protocol::{RoomId, UserId};
use tokio::sync::{mpsc, oneshot};

use crate::{Client, ConnectionId, RoomError};

/// Registry actor settings.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of the actor's command mailbox. Callers wait when it is
    /// full.
    pub mailbox_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { mailbox_size: 256 }
    }
}

/// Commands sent to the registry actor.
enum RegistryCommand {
    Register {
        room_id: RoomId,
        client: Client,
        reply: oneshot::Sender<usize>,
    },
    Unregister {
        room_id: RoomId,
        user_id: UserId,
        conn_id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        room_id: RoomId,
        reply: oneshot::Sender<Vec<Client>>,
    },
    RoomCount {
        reply: oneshot::Sender<usize>,
    },
    Shutdown,
}

/// Handle to the running registry actor. Cheap to clone.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Adds `client` to `room_id`, creating the room on first use.
    ///
    /// If the user already has a client in the room, the new one takes its
    /// place and the old one's sender is dropped. Returns the room's member
    /// count after the insert.
    ///
    /// # Errors
    /// `RoomError::Unavailable` if the registry has shut down.
    pub async fn register(&self, room_id: RoomId, client: Client) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Register {
            room_id,
            client,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| unavailable())
    }

    /// Removes the client for `user_id` from `room_id`, but only if it is
    /// still the connection identified by `conn_id`.
    ///
    /// Returns whether anything was removed.
    pub async fn unregister(
        &self,
        room_id: RoomId,
        user_id: UserId,
        conn_id: ConnectionId,
    ) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Unregister {
            room_id,
            user_id,
            conn_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| unavailable())
    }

    /// Point-in-time copy of a room's clients, in registration order.
    /// Unknown rooms yield an empty list.
    pub async fn snapshot(&self, room_id: RoomId) -> Result<Vec<Client>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Snapshot {
            room_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| unavailable())
    }

    /// Number of rooms with at least one client.
    pub async fn room_count(&self) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::RoomCount { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| unavailable())
    }

    /// Stops the actor after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RegistryCommand::Shutdown).await
    }

    async fn send(&self, cmd: RegistryCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| unavailable())
    }
}

fn unavailable() -> RoomError {
    RoomError::Unavailable("room registry")
}

/// Spawns the registry actor and returns a handle to it.
pub fn spawn_registry(config: RegistryConfig) -> RegistryHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_size.max(1));
    let actor = RegistryActor {
        rooms: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());
    RegistryHandle { sender: tx }
}

/// The actor state. Runs inside its own Tokio task.
struct RegistryActor {
    /// Clients per room, in registration order. Rooms are never empty.
    rooms: HashMap<RoomId, Vec<Client>>,
    receiver: mpsc::Receiver<RegistryCommand>,
}

impl RegistryActor {
    async fn run(mut self) {
        tracing::info!("room registry started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RegistryCommand::Register {
                    room_id,
                    client,
                    reply,
                } => {
                    let count = self.handle_register(room_id, client);
                    let _ = reply.send(count);
                }
                RegistryCommand::Unregister {
                    room_id,
                    user_id,
                    conn_id,
                    reply,
                } => {
                    let removed = self.handle_unregister(&room_id, &user_id, conn_id);
                    let _ = reply.send(removed);
                }
                RegistryCommand::Snapshot { room_id, reply } => {
                    let clients = self.rooms.get(&room_id).cloned().unwrap_or_default();
                    let _ = reply.send(clients);
                }
                RegistryCommand::RoomCount { reply } => {
                    let _ = reply.send(self.rooms.len());
                }
                RegistryCommand::Shutdown => {
                    tracing::info!(rooms = self.rooms.len(), "room registry shutting down");
                    break;
                }
            }
        }

        tracing::info!("room registry stopped");
    }

    fn handle_register(&mut self, room_id: RoomId, client: Client) -> usize {
        let clients = self.rooms.entry(room_id.clone()).or_default();
        let user_id = client.user_id().clone();
        let conn_id = client.conn_id();

        match clients.iter_mut().find(|c| c.user_id() == &user_id) {
            Some(slot) => {
                // Dropping the old sender ends that connection's writer.
                let old = std::mem::replace(slot, client);
                tracing::info!(
                    %room_id,
                    %user_id,
                    %conn_id,
                    replaced = %old.conn_id(),
                    "client replaced"
                );
            }
            None => {
                tracing::info!(%room_id, %user_id, %conn_id, "client registered");
                clients.push(client);
            }
        }
        clients.len()
    }

    fn handle_unregister(
        &mut self,
        room_id: &RoomId,
        user_id: &UserId,
        conn_id: ConnectionId,
    ) -> bool {
        let Some(clients) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let before = clients.len();
        clients.retain(|c| !(c.user_id() == user_id && c.conn_id() == conn_id));
        let removed = clients.len() != before;

        if clients.is_empty() {
            self.rooms.remove(room_id);
            tracing::debug!(%room_id, "room emptied");
        }
        if removed {
            tracing::info!(%room_id, %user_id, %conn_id, "client unregistered");
        }
        removed
    }
}
