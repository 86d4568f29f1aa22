//! Typed events and their conversion to and from the wire envelope.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;

use crate::{
    AddPointDetail, Codec, Details, Envelope, EventKind, ProtocolError, RoomId, RoomJoinDetail,
    StateDetail, SuspendDetail, UserId,
};

/// A validated event: a kind, the room it belongs to, an optional sender,
/// and a payload whose shape is guaranteed to match the kind.
///
/// Fields are private so the kind/payload pairing can't be broken after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    room_id: RoomId,
    user_id: Option<UserId>,
    details: Details,
}

impl Event {
    /// Builds an event, checking that `details` belongs to `kind`.
    ///
    /// An empty `user_id` is normalized to `None`.
    ///
    /// # Errors
    /// `ProtocolError::SchemaMismatch` if the payload was built for a
    /// different kind.
    pub fn new(
        kind: EventKind,
        room_id: RoomId,
        user_id: Option<UserId>,
        details: Details,
    ) -> Result<Self, ProtocolError> {
        if details.kind() != kind {
            return Err(ProtocolError::SchemaMismatch {
                expected: kind,
                found: details.kind(),
            });
        }
        Ok(Self {
            kind,
            room_id,
            user_id: user_id.filter(|u| !u.is_empty()),
            details,
        })
    }

    /// A room-wide event with no originating user.
    pub fn system(room_id: RoomId, details: Details) -> Self {
        Self {
            kind: details.kind(),
            room_id,
            user_id: None,
            details,
        }
    }

    /// An event originating from `user_id`.
    pub fn from_user(room_id: RoomId, user_id: UserId, details: Details) -> Self {
        Self {
            kind: details.kind(),
            room_id,
            user_id: Some(user_id).filter(|u| !u.is_empty()),
            details,
        }
    }

    /// `Room:Join` for `user_id`, announcing the new member count.
    pub fn room_join(room_id: RoomId, user_id: UserId, player_count: usize) -> Self {
        Self::from_user(
            room_id,
            user_id,
            Details::RoomJoin(RoomJoinDetail { player_count }),
        )
    }

    /// `AvoidYuriko:State` snapshot.
    pub fn state(room_id: RoomId, detail: StateDetail) -> Self {
        Self::system(room_id, Details::State(detail))
    }

    /// `AvoidYuriko:Suspend` carrying the reason.
    pub fn suspend(room_id: RoomId, message: impl Into<String>) -> Self {
        Self::system(
            room_id,
            Details::Suspend(SuspendDetail {
                message: message.into(),
            }),
        )
    }

    /// `AvoidYuriko:Finish`.
    pub fn finish(room_id: RoomId) -> Self {
        Self::system(room_id, Details::Finish)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// The originating user, or `None` for room-wide events.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Returns a copy of this event attributed to another room and sender.
    ///
    /// Connection handlers use this to stamp client-sent events with the
    /// identity the connection was authorized for.
    pub fn reattributed(self, room_id: RoomId, user_id: UserId) -> Self {
        Self {
            room_id,
            user_id: Some(user_id).filter(|u| !u.is_empty()),
            ..self
        }
    }

    // -----------------------------------------------------------------------
    // Envelope conversion
    // -----------------------------------------------------------------------

    /// Converts to the wire envelope, serializing the payload into
    /// `details` with `codec`.
    pub fn to_envelope<C: Codec>(&self, codec: &C) -> Result<Envelope, ProtocolError> {
        let details = match &self.details {
            Details::RoomJoin(d) => codec.encode_string(d)?,
            Details::AddPoint(d) => codec.encode_string(d)?,
            Details::State(d) => codec.encode_string(d)?,
            Details::Suspend(d) => codec.encode_string(d)?,
            Details::GameStart | Details::Finish => String::new(),
        };
        Ok(Envelope {
            event: self.kind.as_str().to_string(),
            room_id: self.room_id.as_str().to_string(),
            user_id: self
                .user_id
                .as_ref()
                .map(|u| u.as_str().to_string())
                .unwrap_or_default(),
            details,
        })
    }

    /// Validates a wire envelope and decodes its payload with `codec`.
    ///
    /// # Errors
    /// - `UnknownEvent` for an unrecognized `event` string
    /// - `Decode` when `details` doesn't parse as the kind's payload
    /// - `InvalidMessage` for an empty room id or a negative point delta
    pub fn from_envelope<C: Codec>(envelope: Envelope, codec: &C) -> Result<Self, ProtocolError> {
        let kind: EventKind = envelope.event.parse()?;
        if envelope.room_id.is_empty() {
            return Err(ProtocolError::InvalidMessage("room_id is empty".into()));
        }

        if !kind.has_payload() {
            ensure_no_payload(codec, kind, &envelope.details)?;
        }

        let raw = envelope.details.as_bytes();
        let details = match kind {
            EventKind::RoomJoin => Details::RoomJoin(codec.decode(raw)?),
            EventKind::AvoidYurikoAddPoint => {
                let detail: AddPointDetail = codec.decode(raw)?;
                if detail.point < 0 {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "point must not be negative, got {}",
                        detail.point
                    )));
                }
                Details::AddPoint(detail)
            }
            EventKind::AvoidYurikoState => Details::State(codec.decode(raw)?),
            EventKind::AvoidYurikoSuspend => Details::Suspend(codec.decode(raw)?),
            EventKind::GameStartAvoidYuriko => Details::GameStart,
            EventKind::AvoidYurikoFinish => Details::Finish,
        };

        Event::new(
            kind,
            RoomId::new(envelope.room_id),
            Some(UserId::new(envelope.user_id)),
            details,
        )
    }
}

/// Payload-less kinds accept an empty `details` or any well-formed object;
/// clients commonly send `"{}"`.
fn ensure_no_payload<C: Codec>(
    codec: &C,
    kind: EventKind,
    details: &str,
) -> Result<(), ProtocolError> {
    let trimmed = details.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    codec
        .decode::<BTreeMap<String, IgnoredAny>>(trimmed.as_bytes())
        .map(|_| ())
        .map_err(|e| ProtocolError::InvalidMessage(format!("{kind} takes no details: {e}")))
}

// ---------------------------------------------------------------------------
// Whole-frame helpers
// ---------------------------------------------------------------------------

/// Decodes one inbound frame into a validated [`Event`].
pub fn decode_event<C: Codec>(codec: &C, data: &[u8]) -> Result<Event, ProtocolError> {
    let envelope: Envelope = codec.decode(data)?;
    Event::from_envelope(envelope, codec)
}

/// Encodes an [`Event`] into one outbound frame.
pub fn encode_event<C: Codec>(codec: &C, event: &Event) -> Result<Vec<u8>, ProtocolError> {
    let envelope = event.to_envelope(codec)?;
    codec.encode(&envelope)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::JsonCodec;

    fn room() -> RoomId {
        RoomId::new("room-1")
    }

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn test_new_rejects_mismatched_payload() {
        let err = Event::new(
            EventKind::RoomJoin,
            room(),
            None,
            Details::Suspend(SuspendDetail {
                message: "x".into(),
            }),
        )
        .unwrap_err();

        match err {
            ProtocolError::SchemaMismatch { expected, found } => {
                assert_eq!(expected, EventKind::RoomJoin);
                assert_eq!(found, EventKind::AvoidYurikoSuspend);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_new_normalizes_empty_user_to_none() {
        let event = Event::new(
            EventKind::AvoidYurikoFinish,
            room(),
            Some(user("")),
            Details::Finish,
        )
        .unwrap();
        assert!(event.user_id().is_none());
    }

    #[test]
    fn test_join_envelope_is_double_encoded() {
        let event = Event::room_join(room(), user("alice"), 2);
        let bytes = encode_event(&JsonCodec, &event).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["event"], "Room:Join");
        assert_eq!(json["room_id"], "room-1");
        assert_eq!(json["user_id"], "alice");
        // `details` is a string holding JSON, not a nested object.
        assert_eq!(json["details"], r#"{"player_count":2}"#);
    }

    #[test]
    fn test_state_envelope_has_empty_user() {
        let mut user_scores = BTreeMap::new();
        user_scores.insert(user("alice"), 4);
        let event = Event::state(
            room(),
            StateDetail {
                remaining: 12.5,
                user_scores,
            },
        );
        let env = event.to_envelope(&JsonCodec).unwrap();

        assert_eq!(env.user_id, "");
        let inner: serde_json::Value = serde_json::from_str(&env.details).unwrap();
        assert_eq!(inner["remaining"], 12.5);
        assert_eq!(inner["user_scores"]["alice"], 4);
    }

    #[test]
    fn test_finish_envelope_has_empty_details() {
        let env = Event::finish(room()).to_envelope(&JsonCodec).unwrap();
        assert_eq!(env.event, "AvoidYuriko:Finish");
        assert_eq!(env.details, "");
    }

    #[test]
    fn test_suspend_message_is_escaped() {
        // A quote in the reason must not break the nested JSON.
        let env = Event::suspend(room(), r#"db said "no""#)
            .to_envelope(&JsonCodec)
            .unwrap();
        let inner: SuspendDetail = serde_json::from_str(&env.details).unwrap();
        assert_eq!(inner.message, r#"db said "no""#);
    }

    #[test]
    fn test_decode_add_point_from_browser_frame() {
        let frame = br#"{"event":"AvoidYuriko:AddPoint","room_id":"room-1","user_id":"bob","details":"{\"point\":3}"}"#;
        let event = decode_event(&JsonCodec, frame).unwrap();

        assert_eq!(event.kind(), EventKind::AvoidYurikoAddPoint);
        assert_eq!(event.user_id(), Some(&user("bob")));
        assert_eq!(
            event.details(),
            &Details::AddPoint(AddPointDetail { point: 3 })
        );
    }

    #[test]
    fn test_decode_game_start_accepts_empty_or_object_details() {
        for details in ["", "{}", r#"{"ready":true}"#] {
            let env = Envelope {
                event: "GameStart:AvoidYuriko".into(),
                room_id: "room-1".into(),
                user_id: "alice".into(),
                details: details.into(),
            };
            let event = Event::from_envelope(env, &JsonCodec).unwrap();
            assert_eq!(event.details(), &Details::GameStart);
        }
    }

    #[test]
    fn test_decode_payloadless_kinds_reject_non_object_details() {
        for (event, details) in [
            ("GameStart:AvoidYuriko", "42"),
            ("GameStart:AvoidYuriko", "{not json}"),
            ("GameStart:AvoidYuriko", "[]"),
            ("AvoidYuriko:Finish", "{\"unterminated\":"),
        ] {
            let env = Envelope {
                event: event.into(),
                room_id: "room-1".into(),
                user_id: "alice".into(),
                details: details.into(),
            };
            assert!(
                matches!(
                    Event::from_envelope(env, &JsonCodec),
                    Err(ProtocolError::InvalidMessage(_))
                ),
                "{event} accepted details {details:?}"
            );
        }
    }

    #[test]
    fn test_decode_unknown_event_fails() {
        let frame = br#"{"event":"Room:Leave","room_id":"room-1","user_id":"bob","details":""}"#;
        assert!(matches!(
            decode_event(&JsonCodec, frame),
            Err(ProtocolError::UnknownEvent(_))
        ));
    }

    #[test]
    fn test_decode_wrong_payload_shape_fails() {
        let frame = br#"{"event":"AvoidYuriko:AddPoint","room_id":"room-1","user_id":"bob","details":"{\"points\":3}"}"#;
        assert!(matches!(
            decode_event(&JsonCodec, frame),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_negative_point_fails() {
        let frame = br#"{"event":"AvoidYuriko:AddPoint","room_id":"room-1","user_id":"bob","details":"{\"point\":-5}"}"#;
        assert!(matches!(
            decode_event(&JsonCodec, frame),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_decode_empty_room_fails() {
        let frame = br#"{"event":"AvoidYuriko:Finish","room_id":"","user_id":"","details":""}"#;
        assert!(matches!(
            decode_event(&JsonCodec, frame),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_event(&JsonCodec, b"hello").is_err());
    }

    #[test]
    fn test_reattributed_overrides_identity() {
        let event = Event::from_user(RoomId::new("spoofed"), user("mallory"), Details::GameStart)
            .reattributed(room(), user("alice"));
        assert_eq!(event.room_id(), &room());
        assert_eq!(event.user_id(), Some(&user("alice")));
        assert_eq!(event.kind(), EventKind::GameStartAvoidYuriko);
    }
}
