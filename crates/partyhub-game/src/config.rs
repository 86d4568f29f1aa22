//! Game session configuration and lifecycle states.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Tunables for a timed AvoidYuriko session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seconds on the clock when the game starts.
    pub start_time: f32,

    /// Seconds removed from the clock per tick.
    pub step: f32,

    /// Wall-clock time between ticks.
    pub tick_interval: Duration,

    /// Capacity of the per-session snapshot pipeline. The timer waits
    /// when it is full.
    pub snapshot_queue: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_time: 30.0,
            step: 0.5,
            tick_interval: Duration::from_millis(500),
            snapshot_queue: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle of a game session.
///
/// ```text
/// Starting → Running → Finished
///     │         │
///     └─────────┴────→ Suspended
/// ```
///
/// A room with no session, or whose last session is `Finished` or
/// `Suspended`, can start a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Participants are being registered with the store.
    Starting,
    /// The countdown is ticking.
    Running,
    /// The countdown reached zero and `Finish` was published.
    Finished,
    /// A store failure stopped the game and `Suspend` was published.
    Suspended,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::Running => write!(f, "Running"),
            Self::Finished => write!(f, "Finished"),
            Self::Suspended => write!(f, "Suspended"),
        }
    }
}
