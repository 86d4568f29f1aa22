//! In-memory [`Gateway`] implementation.
//!
//! Used by the `partyhub` binary when no external database is configured,
//! and as the base for test doubles. All data lives behind one Tokio mutex;
//! every method holds it for a single map operation, which is what makes
//! `increment_score` atomic.

use std::collections::{HashMap, HashSet};

use partyhub_protocol::{RoomId, UserId};
use tokio::sync::Mutex;

use crate::{Gateway, StoreError};

#[derive(Debug, Default)]
struct Tables {
    rooms: HashSet<RoomId>,
    users: HashSet<(RoomId, UserId)>,
    scores: HashMap<(RoomId, UserId), i64>,
}

/// A process-local store. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms created so far.
    pub async fn room_count(&self) -> usize {
        self.tables.lock().await.rooms.len()
    }
}

impl Gateway for MemoryStore {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.rooms.contains(room_id))
    }

    async fn user_in_room(&self, room_id: &RoomId, user_id: &UserId) -> Result<bool, StoreError> {
        let key = (room_id.clone(), user_id.clone());
        Ok(self.tables.lock().await.users.contains(&key))
    }

    async fn register_game_participant(
        &self,
        user_id: &UserId,
        room_id: &RoomId,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.rooms.contains(room_id) {
            return Err(StoreError::RoomNotFound(room_id.clone()));
        }
        // A new game starts every participant from zero.
        tables
            .scores
            .insert((room_id.clone(), user_id.clone()), 0);
        tracing::debug!(%room_id, %user_id, "game participant registered");
        Ok(())
    }

    async fn get_score(&self, room_id: &RoomId, user_id: &UserId) -> Result<i64, StoreError> {
        let key = (room_id.clone(), user_id.clone());
        self.tables
            .lock()
            .await
            .scores
            .get(&key)
            .copied()
            .ok_or_else(|| StoreError::ParticipantNotFound {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
            })
    }

    async fn increment_score(
        &self,
        delta: i64,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        let key = (room_id.clone(), user_id.clone());
        let mut tables = self.tables.lock().await;
        let score = tables
            .scores
            .get_mut(&key)
            .ok_or_else(|| StoreError::ParticipantNotFound {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
            })?;
        *score = score
            .checked_add(delta)
            .ok_or_else(|| StoreError::ScoreOverflow {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
            })?;
        Ok(())
    }

    async fn create_room(&self, room_id: &RoomId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.rooms.insert(room_id.clone()) {
            return Err(StoreError::Duplicate(format!("room {room_id}")));
        }
        tracing::info!(%room_id, "room created");
        Ok(())
    }

    async fn add_user(&self, user_id: &UserId, room_id: &RoomId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.rooms.contains(room_id) {
            return Err(StoreError::RoomNotFound(room_id.clone()));
        }
        if !tables.users.insert((room_id.clone(), user_id.clone())) {
            return Err(StoreError::Duplicate(format!("user {user_id}")));
        }
        tracing::info!(%room_id, %user_id, "user added to room");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id)
    }

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    async fn store_with_participant() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_room(&room("r")).await.unwrap();
        store.add_user(&user("alice"), &room("r")).await.unwrap();
        store
            .register_game_participant(&user("alice"), &room("r"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_room_exists_after_create() {
        let store = MemoryStore::new();
        assert!(!store.room_exists(&room("r")).await.unwrap());
        store.create_room(&room("r")).await.unwrap();
        assert!(store.room_exists(&room("r")).await.unwrap());
        assert_eq!(store.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_room_twice_is_duplicate() {
        let store = MemoryStore::new();
        store.create_room(&room("r")).await.unwrap();
        let err = store.create_room(&room("r")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_add_user_requires_room() {
        let store = MemoryStore::new();
        let err = store.add_user(&user("alice"), &room("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::RoomNotFound(_)));
    }

    #[tokio::test]
    async fn test_user_in_room_is_scoped_to_room() {
        let store = MemoryStore::new();
        store.create_room(&room("a")).await.unwrap();
        store.create_room(&room("b")).await.unwrap();
        store.add_user(&user("alice"), &room("a")).await.unwrap();

        assert!(store.user_in_room(&room("a"), &user("alice")).await.unwrap());
        assert!(!store.user_in_room(&room("b"), &user("alice")).await.unwrap());
    }

    #[tokio::test]
    async fn test_registered_participant_starts_at_zero() {
        let store = store_with_participant().await;
        assert_eq!(store.get_score(&room("r"), &user("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_is_additive() {
        let store = store_with_participant().await;
        store.increment_score(3, &room("r"), &user("alice")).await.unwrap();
        store.increment_score(3, &room("r"), &user("alice")).await.unwrap();
        assert_eq!(store.get_score(&room("r"), &user("alice")).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_reregistering_resets_score() {
        let store = store_with_participant().await;
        store.increment_score(5, &room("r"), &user("alice")).await.unwrap();
        store
            .register_game_participant(&user("alice"), &room("r"))
            .await
            .unwrap();
        assert_eq!(store.get_score(&room("r"), &user("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_score_of_non_participant_is_error() {
        let store = store_with_participant().await;
        let err = store.get_score(&room("r"), &user("bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::ParticipantNotFound { .. }));
        let err = store
            .increment_score(1, &room("r"), &user("bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ParticipantNotFound { .. }));
    }

    #[tokio::test]
    async fn test_increment_overflow_is_error() {
        let store = store_with_participant().await;
        store
            .increment_score(i64::MAX, &room("r"), &user("alice"))
            .await
            .unwrap();
        let err = store
            .increment_score(1, &room("r"), &user("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ScoreOverflow { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = std::sync::Arc::new(store_with_participant().await);
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = std::sync::Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.increment_score(2, &room("r"), &user("alice")).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.get_score(&room("r"), &user("alice")).await.unwrap(), 100);
    }
}
