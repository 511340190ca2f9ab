//! Registry of active rooms, keyed by base room id.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{RoomId, Timestamp};

use super::{RegistryError, RoomHandle};

/// Thread-safe map of room id to [`RoomHandle`]
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running room. Fails if the base id is already taken.
    pub async fn insert(&self, room: RoomHandle) -> Result<(), RegistryError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(room.id()) {
            return Err(RegistryError::DuplicateRoomId(room.id().clone()));
        }
        rooms.insert(room.id().clone(), room);
        Ok(())
    }

    pub async fn get(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &RoomId) -> bool {
        self.rooms.read().await.contains_key(id)
    }

    /// All registered rooms, oldest first
    pub async fn rooms(&self) -> Vec<RoomHandle> {
        let mut rooms: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();
        rooms.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });
        rooms
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Remove and close every room that has expired at `now` or whose actor
    /// has already stopped. Returns the ids of the retired rooms.
    pub async fn retire_expired(&self, now: Timestamp) -> Vec<RoomId> {
        let retired: Vec<RoomHandle> = {
            let mut rooms = self.rooms.write().await;
            let ids: Vec<RoomId> = rooms
                .values()
                .filter(|room| room.is_expired(now) || room.is_closed())
                .map(|room| room.id().clone())
                .collect();
            ids.iter().filter_map(|id| rooms.remove(id)).collect()
        };

        retired
            .into_iter()
            .map(|room| {
                room.close();
                room.id().clone()
            })
            .collect()
    }
}
