//! Timed AvoidYuriko game sessions for partyhub.
//!
//! A member sends `GameStart:AvoidYuriko`; the [`GameController`] freezes
//! the room's roster, registers each participant with the store, and runs
//! a 30 second countdown that publishes a score `State` every half second
//! and a final `Finish`. Any store failure ends the game with a single
//! `Suspend`.
//!
//! # Key types
//!
//! - [`GameController`]: starts sessions, records point submissions
//! - [`GameConfig`]: clock and pipeline settings
//! - [`SessionState`]: Starting → Running → Finished / Suspended
//! - [`Countdown`]: the step-counted game clock

mod config;
mod controller;
mod countdown;
mod error;
mod session;

pub use config::{GameConfig, SessionState};
pub use controller::GameController;
pub use countdown::{Countdown, Step};
pub use error::GameError;
