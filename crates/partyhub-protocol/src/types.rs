//! Core protocol types for the partyhub wire format.
//!
//! Everything in this module travels "on the wire": identifiers, the closed
//! set of event kinds, the per-kind payload shapes, and the outer envelope.
//!
//! The envelope is *double-encoded*: the payload is serialized on its own
//! and the resulting JSON text is embedded as the `details` string of the
//! envelope. Browsers already depend on this, so field names and the nesting
//! must not change.
//!
//! ```text
//! {
//!   "event":   "AvoidYuriko:State",
//!   "room_id": "f6d7ce7e-abfa-11eb-aa83-acde48001122",
//!   "user_id": "",
//!   "details": "{\"remaining\":3.5,\"user_scores\":{\"alice\":0}}"
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier of a room.
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw room id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a user (a participant of one room).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty id, which the wire uses for room-wide events.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// The closed set of events the server understands.
///
/// The wire names (`"Room:Join"`, ...) are namespaced by a prefix: `Room`
/// for membership, `GameStart` for launching a game, and the game's own
/// name for everything that happens while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A client joined the room. Delivered to everyone, joiner included.
    RoomJoin,
    /// A member asked to start the AvoidYuriko game.
    GameStartAvoidYuriko,
    /// A participant scored points.
    AvoidYurikoAddPoint,
    /// Periodic countdown + scoreboard snapshot.
    AvoidYurikoState,
    /// The game stopped early because of an error.
    AvoidYurikoSuspend,
    /// The countdown reached zero.
    AvoidYurikoFinish,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::RoomJoin,
        EventKind::GameStartAvoidYuriko,
        EventKind::AvoidYurikoAddPoint,
        EventKind::AvoidYurikoState,
        EventKind::AvoidYurikoSuspend,
        EventKind::AvoidYurikoFinish,
    ];

    /// The exact string used in the envelope's `event` field.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RoomJoin => "Room:Join",
            EventKind::GameStartAvoidYuriko => "GameStart:AvoidYuriko",
            EventKind::AvoidYurikoAddPoint => "AvoidYuriko:AddPoint",
            EventKind::AvoidYurikoState => "AvoidYuriko:State",
            EventKind::AvoidYurikoSuspend => "AvoidYuriko:Suspend",
            EventKind::AvoidYurikoFinish => "AvoidYuriko:Finish",
        }
    }

    /// Whether this kind carries a payload in `details`.
    pub fn has_payload(self) -> bool {
        !matches!(
            self,
            EventKind::GameStartAvoidYuriko | EventKind::AvoidYurikoFinish
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownEvent(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Payload shapes
// ---------------------------------------------------------------------------

/// Payload of `Room:Join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomJoinDetail {
    /// Number of clients connected to the room after the join.
    pub player_count: usize,
}

/// Payload of `AvoidYuriko:AddPoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPointDetail {
    /// Points to add to the sender's score.
    pub point: i64,
}

/// Payload of `AvoidYuriko:State`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDetail {
    /// Seconds left on the countdown.
    pub remaining: f32,
    /// Current score of every participant of the running game.
    pub user_scores: BTreeMap<UserId, i64>,
}

/// Payload of `AvoidYuriko:Suspend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendDetail {
    /// Human-readable reason the game stopped.
    pub message: String,
}

/// A decoded payload, one variant per [`EventKind`].
///
/// Kinds without a payload still get a variant so that an [`Event`]
/// always carries exactly one `Details` value.
///
/// [`Event`]: crate::Event
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    RoomJoin(RoomJoinDetail),
    GameStart,
    AddPoint(AddPointDetail),
    State(StateDetail),
    Suspend(SuspendDetail),
    Finish,
}

impl Details {
    /// The event kind this payload belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Details::RoomJoin(_) => EventKind::RoomJoin,
            Details::GameStart => EventKind::GameStartAvoidYuriko,
            Details::AddPoint(_) => EventKind::AvoidYurikoAddPoint,
            Details::State(_) => EventKind::AvoidYurikoState,
            Details::Suspend(_) => EventKind::AvoidYurikoSuspend,
            Details::Finish => EventKind::AvoidYurikoFinish,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope: the top-level wire format
// ---------------------------------------------------------------------------

/// The raw message as it appears on the wire.
///
/// All four fields are plain strings. `user_id` is empty for room-wide
/// events and `details` is empty for kinds without a payload. Use
/// [`Event`](crate::Event) for the validated, typed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    pub room_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub details: String,
}

// =========================================================================
// Tests
// =========================================================================
