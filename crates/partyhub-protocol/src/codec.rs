//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" converts between Rust types and raw bytes. The event layer
//! only needs *something* that implements [`Codec`]; the server ships with
//! [`JsonCodec`] because browsers speak JSON natively and the wire format
//! is fixed to JSON envelopes.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec value is shared by the
/// broadcast task and every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Serializes a value into a UTF-8 string.
    ///
    /// Event payloads travel as a string field *inside* the envelope, so
    /// the nested encoding has to be text.
    fn encode_string<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes)
            .map_err(|e| ProtocolError::InvalidMessage(format!("payload is not UTF-8: {e}")))
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use partyhub_protocol::{Codec, JsonCodec, RoomJoinDetail};
///
/// let codec = JsonCodec;
/// let text = codec.encode_string(&RoomJoinDetail { player_count: 2 }).unwrap();
/// assert_eq!(text, r#"{"player_count":2}"#);
///
/// let back: RoomJoinDetail = codec.decode(text.as_bytes()).unwrap();
/// assert_eq!(back.player_count, 2);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
