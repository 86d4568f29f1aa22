//! The persistence contract the rest of partyhub is written against.
//!
//! The server never talks SQL (or any other storage API) directly. It
//! calls the [`Gateway`] trait, and the binary decides which implementation
//! to plug in. Tests plug in doubles that record calls or inject failures.

use std::future::Future;

use partyhub_protocol::{RoomId, UserId};

use crate::StoreError;

/// Durable storage for rooms, their users, and per-game scores.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one gateway is shared (behind an `Arc`) by
///   every connection task and every game session.
/// - Every method returns a `Send` future so callers can `tokio::spawn`
///   work that awaits it.
///
/// # Atomicity
///
/// [`increment_score`](Self::increment_score) is a single read-modify-write
/// call. Implementations must make it atomic; callers never emulate it
/// with `get_score` + a write.
pub trait Gateway: Send + Sync + 'static {
    /// Whether a room with this id has been created.
    fn room_exists(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Whether `user_id` was issued for `room_id`.
    fn user_in_room(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Records `user_id` as a participant of the game starting in
    /// `room_id`, with a score of zero.
    fn register_game_participant(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Current score of a registered participant.
    fn get_score(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Atomically adds `delta` to a registered participant's score.
    fn increment_score(
        &self,
        delta: i64,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Creates an empty room.
    fn create_room(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Issues `user_id` for an existing room.
    fn add_user(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
