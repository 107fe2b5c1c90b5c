//! UseCase: メッセージ取得処理
//!
//! Clients poll with the cursor returned by their previous call. A cursor
//! equal to the log length yields an empty batch and the same cursor.

use std::sync::Arc;

use crate::domain::{
    ClientIdentity, Cursor, PresenceRepository, RepositoryError, RoomName, RoomRepository,
    SessionRepository,
};

use super::{error::UseCaseError, require_current_room, require_username};

/// メッセージ取得のユースケース
pub struct FetchMessagesUseCase {
    sessions: Arc<dyn SessionRepository>,
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
}

impl FetchMessagesUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
    ) -> Self {
        Self {
            sessions,
            rooms,
            presence,
        }
    }

    /// Rendered messages in `[cursor, len)` of the current room and the new cursor
    pub async fn fetch(
        &self,
        identity: ClientIdentity,
        cursor: Cursor,
    ) -> Result<(String, Cursor), UseCaseError> {
        let room = self.current_room(&identity).await?;
        let result = self.rooms.fetch(&room, cursor).await;
        self.check_room_exists(&identity, &room, result).await
    }

    /// Current length of the current room's log
    pub async fn message_index(&self, identity: ClientIdentity) -> Result<Cursor, UseCaseError> {
        let room = self.current_room(&identity).await?;
        let result = self.rooms.message_index(&room).await;
        self.check_room_exists(&identity, &room, result).await
    }

    async fn current_room(&self, identity: &ClientIdentity) -> Result<RoomName, UseCaseError> {
        require_username(self.sessions.as_ref(), identity).await?;
        require_current_room(self.presence.as_ref(), identity).await
    }

    async fn check_room_exists<T>(
        &self,
        identity: &ClientIdentity,
        room: &RoomName,
        result: Result<T, RepositoryError>,
    ) -> Result<T, UseCaseError> {
        match result {
            Ok(value) => Ok(value),
            Err(RepositoryError::RoomNotFound(_)) => {
                tracing::error!("{} is recorded in missing room '{}'", identity, room);
                self.presence.release(identity).await;
                Err(UseCaseError::Inconsistent(format!(
                    "current room '{}' no longer exists",
                    room
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}
