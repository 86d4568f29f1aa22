//! One timed game, from participant registration to its terminal event.
//!
//! A running session is two tasks:
//!
//! - the **timer** ticks the [`Countdown`] on a [`TickScheduler`] and
//!   queues one request per tick;
//! - the **snapshot pipeline** handles those requests strictly in order,
//!   reading every participant's score and publishing `State`, then
//!   `Finish`.
//!
//! If a score read fails the pipeline publishes `Suspend` and returns.
//! Dropping its receiver discards whatever is still queued and makes the
//! timer's next send fail, which stops the timer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use partyhub_protocol::{Event, RoomId, StateDetail, UserId};
use partyhub_room::{HubHandle, RegistryHandle};
use partyhub_store::{Gateway, StoreError};
use partyhub_tick::{TickConfig, TickScheduler};
use tokio::sync::{Mutex, mpsc};

use crate::countdown::{Countdown, Step};
use crate::{GameConfig, GameError, SessionState};

/// State of every room with a session still starting or running.
pub(crate) type SessionTable = Arc<Mutex<HashMap<RoomId, SessionState>>>;

/// A unit of work for the snapshot pipeline.
#[derive(Debug)]
enum SnapshotRequest {
    State { remaining: f32 },
    Finish,
}

pub(crate) struct Session<G: Gateway> {
    pub(crate) room_id: RoomId,
    pub(crate) gateway: Arc<G>,
    pub(crate) registry: RegistryHandle,
    pub(crate) hub: HubHandle,
    pub(crate) config: GameConfig,
    pub(crate) sessions: SessionTable,
}

impl<G: Gateway> Session<G> {
    /// Drives the session to a terminal state, then drops its table entry.
    pub(crate) async fn run(self) -> SessionState {
        let outcome = match self.prepare().await {
            Ok(roster) => {
                self.set_state(SessionState::Running).await;
                tracing::info!(
                    room_id = %self.room_id,
                    participants = roster.len(),
                    "game running"
                );
                self.run_timer(roster).await
            }
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, error = %e, "game failed to start");
                self.hub.publish(Event::suspend(self.room_id.clone(), e.to_string()));
                SessionState::Suspended
            }
        };

        self.sessions.lock().await.remove(&self.room_id);
        tracing::info!(room_id = %self.room_id, state = %outcome, "game ended");
        outcome
    }

    /// Freezes the roster and registers every participant with the store.
    async fn prepare(&self) -> Result<Vec<UserId>, GameError> {
        let roster: Vec<UserId> = self
            .registry
            .snapshot(self.room_id.clone())
            .await?
            .iter()
            .map(|c| c.user_id().clone())
            .collect();

        for user_id in &roster {
            self.gateway
                .register_game_participant(user_id, &self.room_id)
                .await?;
        }
        Ok(roster)
    }

    async fn run_timer(&self, roster: Vec<UserId>) -> SessionState {
        let (requests_tx, requests_rx) = mpsc::channel(self.config.snapshot_queue.max(1));
        let pipeline = tokio::spawn(snapshot_pipeline(
            self.room_id.clone(),
            roster,
            Arc::clone(&self.gateway),
            self.hub.clone(),
            requests_rx,
        ));

        let mut scheduler = TickScheduler::new(TickConfig::with_period(self.config.tick_interval));
        let mut clock = Countdown::new(self.config.start_time, self.config.step);

        loop {
            tokio::select! {
                _ = requests_tx.closed() => break,
                _ = scheduler.wait_for_tick() => {
                    let request = match clock.tick() {
                        Step::Snapshot(remaining) => SnapshotRequest::State { remaining },
                        Step::Finish => SnapshotRequest::Finish,
                        Step::Done => break,
                    };
                    let last = matches!(request, SnapshotRequest::Finish);
                    if requests_tx.send(request).await.is_err() || last {
                        break;
                    }
                }
            }
        }
        drop(requests_tx);

        tracing::debug!(
            room_id = %self.room_id,
            ticks = scheduler.tick_count(),
            overruns = scheduler.metrics().total_overruns,
            "timer stopped"
        );

        match pipeline.await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(room_id = %self.room_id, error = %e, "snapshot pipeline crashed");
                self.hub.publish(Event::suspend(self.room_id.clone(), e.to_string()));
                SessionState::Suspended
            }
        }
    }

    async fn set_state(&self, state: SessionState) {
        self.sessions
            .lock()
            .await
            .insert(self.room_id.clone(), state);
    }
}

async fn snapshot_pipeline<G: Gateway>(
    room_id: RoomId,
    roster: Vec<UserId>,
    gateway: Arc<G>,
    hub: HubHandle,
    mut requests: mpsc::Receiver<SnapshotRequest>,
) -> SessionState {
    while let Some(request) = requests.recv().await {
        match request {
            SnapshotRequest::State { remaining } => {
                match read_scores(gateway.as_ref(), &room_id, &roster).await {
                    Ok(user_scores) => hub.publish(Event::state(
                        room_id.clone(),
                        StateDetail {
                            remaining,
                            user_scores,
                        },
                    )),
                    Err(e) => {
                        tracing::warn!(%room_id, remaining, error = %e, "score read failed, suspending");
                        hub.publish(Event::suspend(room_id.clone(), e.to_string()));
                        return SessionState::Suspended;
                    }
                }
            }
            SnapshotRequest::Finish => {
                hub.publish(Event::finish(room_id.clone()));
                return SessionState::Finished;
            }
        }
    }

    // The timer never hangs up before queueing Finish.
    tracing::debug!(%room_id, "snapshot pipeline closed before finish");
    SessionState::Suspended
}

async fn read_scores<G: Gateway>(
    gateway: &G,
    room_id: &RoomId,
    roster: &[UserId],
) -> Result<BTreeMap<UserId, i64>, StoreError> {
    let mut scores = BTreeMap::new();
    for user_id in roster {
        let score = gateway.get_score(room_id, user_id).await?;
        scores.insert(user_id.clone(), score);
    }
    Ok(scores)
}
