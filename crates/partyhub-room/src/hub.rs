//! Broadcast hub: fans events out to the members of their room.
//!
//! One delivery task consumes published events in FIFO order. For each
//! event it asks the registry for the room's current clients, encodes the
//! envelope once, and pushes the shared frame to every recipient the
//! delivery rule allows.

use std::sync::Arc;

use partyhub_protocol::{Codec, Event, EventKind, UserId};
use tokio::sync::{mpsc, oneshot};

use crate::{Frame, RegistryHandle, RoomError};

enum HubCommand {
    Publish(Event),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the running hub. Cheap to clone.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Queues `event` for delivery and returns immediately.
    ///
    /// Events published after [`shutdown`](Self::shutdown) are dropped.
    pub fn publish(&self, event: Event) {
        let room_id = event.room_id().clone();
        let kind = event.kind();
        if self.sender.send(HubCommand::Publish(event)).is_err() {
            tracing::debug!(%room_id, %kind, "hub stopped, event dropped");
        }
    }

    /// Delivers every event published before this call, then stops the
    /// delivery task.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(HubCommand::Shutdown(reply_tx))
            .map_err(|_| RoomError::Unavailable("broadcast hub"))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable("broadcast hub"))
    }
}

/// Whether `event` should be sent to `recipient`.
///
/// `Room:Join` goes to everyone, the joiner included, so every member
/// learns the new head count. Any other event that carries a sender is
/// not echoed back to that sender. Room-wide events go to everyone.
pub fn should_deliver(event: &Event, recipient: &UserId) -> bool {
    if event.kind() == EventKind::RoomJoin {
        return true;
    }
    event.user_id() != Some(recipient)
}

/// Spawns the delivery task and returns a handle to it.
pub fn spawn_hub<C: Codec>(registry: RegistryHandle, codec: C) -> HubHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let hub = Hub {
        registry,
        codec,
        receiver: rx,
    };
    tokio::spawn(hub.run());
    HubHandle { sender: tx }
}

struct Hub<C> {
    registry: RegistryHandle,
    codec: C,
    receiver: mpsc::UnboundedReceiver<HubCommand>,
}

impl<C: Codec> Hub<C> {
    async fn run(mut self) {
        tracing::info!("broadcast hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Publish(event) => {
                    if let Err(e) = deliver(&self.registry, &self.codec, &event).await {
                        tracing::warn!(
                            room_id = %event.room_id(),
                            kind = %event.kind(),
                            error = %e,
                            "event not delivered"
                        );
                    }
                }
                HubCommand::Shutdown(reply) => {
                    // Everything published earlier sits ahead of this
                    // command in the queue, so it has been delivered.
                    self.receiver.close();
                    let _ = reply.send(());
                    break;
                }
            }
        }

        tracing::info!("broadcast hub stopped");
    }
}

async fn deliver<C: Codec>(
    registry: &RegistryHandle,
    codec: &C,
    event: &Event,
) -> Result<(), RoomError> {
    let clients = registry.snapshot(event.room_id().clone()).await?;
    if clients.is_empty() {
        tracing::debug!(room_id = %event.room_id(), kind = %event.kind(), "no recipients");
        return Ok(());
    }

    let envelope = event.to_envelope(codec)?;
    let frame: Frame = Arc::from(codec.encode_string(&envelope)?);

    let mut delivered = 0usize;
    for client in clients.iter().filter(|c| should_deliver(event, c.user_id())) {
        match client.send(Arc::clone(&frame)) {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(
                room_id = %event.room_id(),
                user_id = %client.user_id(),
                error = %e,
                "send to client failed"
            ),
        }
    }

    tracing::trace!(
        room_id = %event.room_id(),
        kind = %event.kind(),
        delivered,
        "event broadcast"
    );
    Ok(())
}
