//! Persistence gateway for partyhub.
//!
//! partyhub doesn't own a database schema. It defines the [`Gateway`]
//! trait (the handful of calls the game server needs) and ships one
//! implementation, [`MemoryStore`], for local play and tests.
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (HTTP + WebSocket)  ← checks room/user existence before upgrading
//! Game sessions              ← register participants, read/increment scores
//!     ↕
//! Gateway (this crate)
//! ```

mod error;
mod gateway;
mod memory;

pub use error::StoreError;
pub use gateway::Gateway;
pub use memory::MemoryStore;
