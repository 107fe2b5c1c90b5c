//! InMemory Room Repository 実装
//!
//! The room directory is a `HashMap` of room handles behind one lock; every
//! room carries its own lock around its member set and message log.
//!
//! Lookups clone the handle and release the directory lock before locking the
//! room. Deletion and listing hold both, always directory first.
//! A deleted room is marked closed under its own lock, so a caller that
//! looked the handle up just before the deletion sees `RoomNotFound`.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    ClientIdentity, Cursor, MessageBody, RepositoryError, Room, RoomName, RoomRepository,
    RoomSummary, Timestamp, Username,
};

type SharedRoom = Arc<Mutex<Room>>;

/// インメモリ Room Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomName, SharedRoom>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock an open room by name
    async fn lock_room(&self, name: &RoomName) -> Result<OwnedMutexGuard<Room>, RepositoryError> {
        let room = {
            let rooms = self.rooms.lock().await;
            rooms
                .get(name)
                .cloned()
                .ok_or_else(|| RepositoryError::RoomNotFound(name.clone()))?
        };

        let guard = room.lock_owned().await;
        if guard.is_closed() {
            return Err(RepositoryError::RoomNotFound(name.clone()));
        }
        Ok(guard)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, name: RoomName, created_at: Timestamp) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&name) {
            return Err(RepositoryError::RoomAlreadyExists(name));
        }
        let room = Room::new(name.clone(), created_at);
        rooms.insert(name, Arc::new(Mutex::new(room)));
        Ok(())
    }

    async fn delete(&self, name: &RoomName) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(name.clone()))?;

        let mut guard = room.lock().await;
        if !guard.is_empty() {
            return Err(RepositoryError::RoomNotEmpty(name.clone()));
        }
        guard.close();
        drop(guard);

        rooms.remove(name);
        Ok(())
    }

    async fn list(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.lock().await;
        let mut summaries = Vec::with_capacity(rooms.len());
        for room in rooms.values() {
            summaries.push(room.lock().await.summary());
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    async fn summary(&self, name: &RoomName) -> Result<RoomSummary, RepositoryError> {
        Ok(self.lock_room(name).await?.summary())
    }

    async fn join(
        &self,
        name: &RoomName,
        identity: ClientIdentity,
        username: &Username,
        timestamp: Timestamp,
    ) -> Result<Cursor, RepositoryError> {
        let mut room = self.lock_room(name).await?;
        Ok(room.join(identity, username, timestamp)?)
    }

    async fn leave(
        &self,
        name: &RoomName,
        identity: &ClientIdentity,
        username: &Username,
        timestamp: Timestamp,
    ) -> Result<Cursor, RepositoryError> {
        let mut room = self.lock_room(name).await?;
        Ok(room.leave(identity, username, timestamp)?)
    }

    async fn post(
        &self,
        name: &RoomName,
        identity: &ClientIdentity,
        username: Username,
        body: MessageBody,
        timestamp: Timestamp,
    ) -> Result<Cursor, RepositoryError> {
        let mut room = self.lock_room(name).await?;
        Ok(room.post(identity, username, body, timestamp)?)
    }

    async fn fetch(
        &self,
        name: &RoomName,
        cursor: Cursor,
    ) -> Result<(String, Cursor), RepositoryError> {
        let room = self.lock_room(name).await?;
        Ok(room.fetch(cursor)?)
    }

    async fn message_index(&self, name: &RoomName) -> Result<Cursor, RepositoryError> {
        Ok(self.lock_room(name).await?.message_index())
    }

    async fn members(&self, name: &RoomName) -> Result<Vec<ClientIdentity>, RepositoryError> {
        Ok(self.lock_room(name).await?.members())
    }
}
