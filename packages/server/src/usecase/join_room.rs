//! UseCase: 入室処理
//!
//! An identity is in at most one room at a time. The presence entry is
//! claimed first, so two concurrent joins from the same identity cannot both
//! succeed; it is released again when the room turns out not to exist.

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ClientIdentity, Cursor, PresenceRepository, RoomName, RoomRepository, SessionRepository,
    Timestamp,
};

use super::{error::UseCaseError, require_username};

/// 入室のユースケース
pub struct JoinRoomUseCase {
    sessions: Arc<dyn SessionRepository>,
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            rooms,
            presence,
            clock,
        }
    }

    /// Join `room` and append the join notice.
    ///
    /// # Returns
    ///
    /// * `Ok(Cursor)` - log length after the notice
    /// * `Err(UseCaseError::RoomNotFound)` - no such room (nothing mutated)
    /// * `Err(UseCaseError::AlreadyInRoom)` - the identity is already in a room
    pub async fn execute(
        &self,
        identity: ClientIdentity,
        room: String,
    ) -> Result<Cursor, UseCaseError> {
        let username = require_username(self.sessions.as_ref(), &identity).await?;
        let room = RoomName::new(room.clone()).map_err(|_| UseCaseError::RoomNotFound(room))?;

        self.presence.claim(identity, room.clone()).await?;

        let timestamp = Timestamp::new(self.clock.now_millis());
        match self.rooms.join(&room, identity, &username, timestamp).await {
            Ok(index) => {
                tracing::info!("'{}' joined room '{}'", username, room);
                Ok(index)
            }
            Err(e) => {
                self.presence.release(&identity).await;
                let error = UseCaseError::from(e);
                if let UseCaseError::Inconsistent(reason) = &error {
                    tracing::error!("{} joined '{}' inconsistently: {}", identity, room, reason);
                }
                Err(error)
            }
        }
    }
}
