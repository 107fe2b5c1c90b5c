//! UseCase: ルーム管理（作成・削除・一覧・参加者一覧）

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ClientIdentity, RepositoryError, RoomName, RoomRepository, RoomSummary, SessionRepository,
    Timestamp, Username,
};

use super::{error::UseCaseError, require_username};

/// A room and the usernames of its members, sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUsers {
    pub room: RoomName,
    pub usernames: Vec<Username>,
}

/// ルーム管理のユースケース
pub struct ManageRoomsUseCase {
    sessions: Arc<dyn SessionRepository>,
    rooms: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl ManageRoomsUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        rooms: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            rooms,
            clock,
        }
    }

    /// Create the room the server starts with; an existing room is kept
    pub async fn ensure_room(&self, name: &str) -> Result<RoomName, UseCaseError> {
        let name = RoomName::new(name.to_string())
            .map_err(|e| UseCaseError::InvalidRoomName(e.to_string()))?;
        let created_at = Timestamp::new(self.clock.now_millis());
        match self.rooms.create(name.clone(), created_at).await {
            Ok(()) | Err(RepositoryError::RoomAlreadyExists(_)) => Ok(name),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, identity: ClientIdentity, name: String) -> Result<(), UseCaseError> {
        let username = require_username(self.sessions.as_ref(), &identity).await?;
        let name = RoomName::new(name.clone()).map_err(|_| UseCaseError::InvalidRoomName(name))?;

        let created_at = Timestamp::new(self.clock.now_millis());
        self.rooms.create(name.clone(), created_at).await?;
        tracing::info!("'{}' created room '{}'", username, name);
        Ok(())
    }

    /// Delete a room; rooms with members are refused
    pub async fn delete(&self, identity: ClientIdentity, name: String) -> Result<(), UseCaseError> {
        let username = require_username(self.sessions.as_ref(), &identity).await?;
        let name = RoomName::new(name.clone()).map_err(|_| UseCaseError::RoomNotFound(name))?;

        self.rooms.delete(&name).await?;
        tracing::info!("'{}' deleted room '{}'", username, name);
        Ok(())
    }

    pub async fn list(&self, identity: ClientIdentity) -> Result<Vec<RoomSummary>, UseCaseError> {
        require_username(self.sessions.as_ref(), &identity).await?;
        Ok(self.rooms.list().await)
    }

    pub async fn list_users(
        &self,
        identity: ClientIdentity,
        name: String,
    ) -> Result<RoomUsers, UseCaseError> {
        require_username(self.sessions.as_ref(), &identity).await?;
        self.room_users(name).await
    }

    /// Every room, for the admin API
    pub async fn snapshot(&self) -> Vec<RoomSummary> {
        self.rooms.list().await
    }

    /// One room and its member names, for the admin API
    pub async fn detail(&self, name: String) -> Result<(RoomSummary, RoomUsers), UseCaseError> {
        let users = self.room_users(name).await?;
        let summary = self.rooms.summary(&users.room).await?;
        Ok((summary, users))
    }

    async fn room_users(&self, name: String) -> Result<RoomUsers, UseCaseError> {
        let room = RoomName::new(name.clone()).map_err(|_| UseCaseError::RoomNotFound(name))?;
        let members = self.rooms.members(&room).await?;

        let mut usernames = self.sessions.usernames_of(&members).await;
        usernames.sort();
        Ok(RoomUsers { room, usernames })
    }
}
