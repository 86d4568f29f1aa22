//! Room membership and event fan-out for partyhub.
//!
//! Two actors live here:
//!
//! - the **registry** ([`RegistryHandle`]) owns the `room → clients` map
//!   and is the only place membership changes;
//! - the **hub** ([`HubHandle`]) takes published events and delivers them
//!   to the clients the registry reports for the event's room.
//!
//! ```text
//! connection handler ──register/unregister──▶ registry
//! connection handler ─┐                          ▲
//! game sessions ──────┴──publish──▶ hub ──snapshot┘──▶ client writers
//! ```

mod client;
mod error;
mod hub;
mod registry;

pub use client::{Client, ClientSender, ConnectionId, Frame};
pub use error::RoomError;
pub use hub::{HubHandle, should_deliver, spawn_hub};
pub use registry::{RegistryConfig, RegistryHandle, spawn_registry};
