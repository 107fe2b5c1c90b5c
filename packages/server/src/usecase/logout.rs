//! UseCase: ログアウト処理
//!
//! Logging out while in a room leaves it first, so the room does not keep a
//! member nobody can act for and can still be deleted once empty.

use std::sync::Arc;

use crate::domain::{ClientIdentity, PresenceRepository, SessionRepository};

use super::{error::UseCaseError, leave_room::LeaveRoomUseCase};

/// ログアウトのユースケース
pub struct LogoutUseCase {
    sessions: Arc<dyn SessionRepository>,
    presence: Arc<dyn PresenceRepository>,
    leave_room: LeaveRoomUseCase,
}

impl LogoutUseCase {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        presence: Arc<dyn PresenceRepository>,
        leave_room: LeaveRoomUseCase,
    ) -> Self {
        Self {
            sessions,
            presence,
            leave_room,
        }
    }

    /// ログアウトを実行
    ///
    /// Idempotent: an identity without a session is a no-op. Only
    /// `UseCaseError::Inconsistent` from the implicit leave is surfaced; the
    /// session is removed either way.
    pub async fn execute(&self, identity: ClientIdentity) -> Result<(), UseCaseError> {
        let mut outcome = Ok(());

        if self.presence.current(&identity).await.is_some() {
            match self.leave_room.execute(identity).await {
                Ok(_) | Err(UseCaseError::UserNotInRoom) | Err(UseCaseError::NotLoggedIn) => {}
                Err(e) => outcome = Err(e),
            }
        }

        match self.sessions.logout(&identity).await {
            Some(username) => tracing::info!("'{}' logged out from {}", username, identity),
            None => tracing::debug!("Logout from {} without a session", identity),
        }

        outcome
    }
}
