//! Entry point for everything game-related a client can ask for.

use std::collections::HashMap;
use std::sync::Arc;

use partyhub_protocol::{Details, Event, RoomId, UserId};
use partyhub_room::{HubHandle, RegistryHandle};
use partyhub_store::Gateway;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::session::{Session, SessionTable};
use crate::{GameConfig, GameError, SessionState};

/// Starts game sessions and records point submissions.
///
/// Cheap to clone; every clone shares the same session table. At most one
/// session per room can be `Starting` or `Running` at a time.
pub struct GameController<G: Gateway> {
    gateway: Arc<G>,
    registry: RegistryHandle,
    hub: HubHandle,
    config: GameConfig,
    sessions: SessionTable,
}

impl<G: Gateway> Clone for GameController<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            registry: self.registry.clone(),
            hub: self.hub.clone(),
            config: self.config.clone(),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<G: Gateway> GameController<G> {
    pub fn new(
        gateway: Arc<G>,
        registry: RegistryHandle,
        hub: HubHandle,
        config: GameConfig,
    ) -> Self {
        Self {
            gateway,
            registry,
            hub,
            config,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a timed game in `room_id` on behalf of `initiator`.
    ///
    /// The start event is re-broadcast to the other members right away;
    /// registration and the countdown run in a background task whose
    /// handle resolves to the session's terminal state.
    ///
    /// # Errors
    /// `GameError::AlreadyRunning` if the room's session is still
    /// starting or running. Nothing is published in that case.
    pub async fn start(
        &self,
        room_id: RoomId,
        initiator: UserId,
    ) -> Result<JoinHandle<SessionState>, GameError> {
        {
            let mut sessions = self.sessions.lock().await;
            if let Some(state) = sessions.get(&room_id).copied() {
                tracing::warn!(%room_id, %initiator, %state, "game already running, start ignored");
                return Err(GameError::AlreadyRunning(room_id));
            }
            sessions.insert(room_id.clone(), SessionState::Starting);
        }

        tracing::info!(%room_id, %initiator, "game starting");
        self.hub.publish(Event::from_user(
            room_id.clone(),
            initiator,
            Details::GameStart,
        ));

        let session = Session {
            room_id,
            gateway: Arc::clone(&self.gateway),
            registry: self.registry.clone(),
            hub: self.hub.clone(),
            config: self.config.clone(),
            sessions: Arc::clone(&self.sessions),
        };
        Ok(tokio::spawn(session.run()))
    }

    /// Adds `point` to the user's score in the background.
    ///
    /// Each call is one `increment_score`; repeated submissions add up.
    /// Failures are logged and dropped.
    pub fn add_point(&self, room_id: RoomId, user_id: UserId, point: i64) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            match gateway.increment_score(point, &room_id, &user_id).await {
                Ok(()) => tracing::debug!(%room_id, %user_id, point, "point added"),
                Err(e) => {
                    tracing::warn!(%room_id, %user_id, point, error = %e, "point submission dropped")
                }
            }
        })
    }

    /// Routes a client-sent event to the matching game operation.
    ///
    /// Returns `false` for kinds the game layer does not handle.
    pub async fn dispatch(&self, event: Event) -> bool {
        let room_id = event.room_id().clone();
        let Some(user_id) = event.user_id().cloned() else {
            tracing::warn!(%room_id, kind = %event.kind(), "client event without sender ignored");
            return false;
        };

        match event.details() {
            Details::GameStart => {
                // AlreadyRunning is logged inside start().
                let _ = self.start(room_id, user_id).await;
                true
            }
            Details::AddPoint(detail) => {
                self.add_point(room_id, user_id, detail.point);
                true
            }
            _ => {
                tracing::warn!(%room_id, %user_id, kind = %event.kind(), "unsupported client event ignored");
                false
            }
        }
    }

    /// The room's session state while a game is starting or running.
    ///
    /// `None` once the session has ended; the terminal state is the
    /// output of the handle returned by [`start`](Self::start).
    pub async fn session_state(&self, room_id: &RoomId) -> Option<SessionState> {
        self.sessions.lock().await.get(room_id).copied()
    }

    /// Number of sessions currently starting or running.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
