//! Wire protocol for partyhub.
//!
//! This crate defines the "language" browsers and the server speak:
//!
//! - **Types** ([`Envelope`], [`EventKind`], the `*Detail` payloads):
//!   the message structures that travel on the wire.
//! - **Events** ([`Event`]): a validated envelope whose payload is known
//!   to match its kind.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! ```text
//! WebSocket frame (bytes) → Envelope → Event → room / game layers
//! ```

mod codec;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{Event, decode_event, encode_event};
pub use types::{
    AddPointDetail, Details, Envelope, EventKind, RoomId, RoomJoinDetail, StateDetail,
    SuspendDetail, UserId,
};
