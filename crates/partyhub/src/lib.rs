//! # partyhub
//!
//! Real-time room hub for browser party games.
//!
//! Clients create a room over HTTP, connect to it over a WebSocket, and
//! receive every event published for that room. One member can start the
//! timed AvoidYuriko game; the server counts it down, reads scores from the
//! store every half second and broadcasts them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partyhub::prelude::*;
//!
//! # async fn run() -> Result<(), PartyHubError> {
//! let server = PartyHubServerBuilder::new()
//!     .bind("127.0.0.1:8080")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
pub mod handler;
pub mod logger;
mod server;
mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody, PartyHubError};
pub use server::{PartyHubServer, PartyHubServerBuilder};
pub use state::AppState;

/// Everything needed to embed a partyhub server.
pub mod prelude {
    pub use crate::{PartyHubError, PartyHubServer, PartyHubServerBuilder, ServerConfig};
    pub use partyhub_game::{GameConfig, SessionState};
    pub use partyhub_protocol::{Event, EventKind, RoomId, UserId};
    pub use partyhub_store::{Gateway, MemoryStore, StoreError};
}
