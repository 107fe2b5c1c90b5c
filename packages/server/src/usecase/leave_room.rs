//! UseCase: 退室処理

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ClientIdentity, Cursor, PresenceRepository, RepositoryError, RoomRepository,
    SessionRepository, Timestamp,
};

use super::{error::UseCaseError, require_username};

/// 退室のユースケース
#[derive(Clone)]
pub struct LeaveRoomUseCase {
    sessions: Arc<dyn SessionRepository>,
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
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

    /// Leave the identity's current room and append the leave notice.
    ///
    /// # Returns
    ///
    /// * `Ok(Cursor)` - log length after the notice
    /// * `Err(UseCaseError::UserNotInRoom)` - the identity is in no room
    /// * `Err(UseCaseError::Inconsistent)` - the recorded room is gone or
    ///   does not list the identity
    pub async fn execute(&self, identity: ClientIdentity) -> Result<Cursor, UseCaseError> {
        let username = require_username(self.sessions.as_ref(), &identity).await?;
        let room = self
            .presence
            .release(&identity)
            .await
            .ok_or(UseCaseError::UserNotInRoom)?;

        let timestamp = Timestamp::new(self.clock.now_millis());
        match self.rooms.leave(&room, &identity, &username, timestamp).await {
            Ok(index) => {
                tracing::info!("'{}' left room '{}'", username, room);
                Ok(index)
            }
            Err(e @ (RepositoryError::RoomNotFound(_) | RepositoryError::Room(_))) => {
                tracing::error!(
                    "{} was recorded in room '{}' but leaving failed: {}",
                    identity,
                    room,
                    e
                );
                Err(UseCaseError::Inconsistent(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
