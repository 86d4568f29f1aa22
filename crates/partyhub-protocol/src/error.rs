//! Error types for the protocol layer.
//!
//! Every variant here is a *validation* failure: the bytes or the values
//! handed to the codec do not describe a well-formed event. None of them
//! are fatal: a connection handler logs the error and keeps reading.

use crate::EventKind;

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (malformed JSON, missing fields, wrong types).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope's `event` field names a kind this server does not know.
    #[error("unknown event kind: {0:?}")]
    UnknownEvent(String),

    /// The payload attached to an event does not have the shape its kind
    /// declares, e.g. a `Room:Join` carrying a score map.
    #[error("payload for {found} does not match event kind {expected}")]
    SchemaMismatch {
        /// The kind the event was declared with.
        expected: EventKind,
        /// The kind the payload actually belongs to.
        found: EventKind,
    },

    /// The message decoded but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
