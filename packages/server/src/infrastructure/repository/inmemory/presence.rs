//! InMemory Presence Repository 実装
//!
//! Tracks the single room each identity is currently in.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientIdentity, PresenceRepository, RepositoryError, RoomName};

/// インメモリ Presence Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryPresenceRepository {
    current_rooms: Mutex<HashMap<ClientIdentity, RoomName>>,
}

impl InMemoryPresenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceRepository for InMemoryPresenceRepository {
    async fn claim(
        &self,
        identity: ClientIdentity,
        room: RoomName,
    ) -> Result<(), RepositoryError> {
        let mut current_rooms = self.current_rooms.lock().await;
        if let Some(current) = current_rooms.get(&identity) {
            return Err(RepositoryError::AlreadyInRoom(current.clone()));
        }
        current_rooms.insert(identity, room);
        Ok(())
    }

    async fn current(&self, identity: &ClientIdentity) -> Option<RoomName> {
        self.current_rooms.lock().await.get(identity).cloned()
    }

    async fn release(&self, identity: &ClientIdentity) -> Option<RoomName> {
        self.current_rooms.lock().await.remove(identity)
    }
}
