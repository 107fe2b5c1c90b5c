//! UseCase: メッセージ投稿処理

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ClientIdentity, Cursor, MessageBody, PresenceRepository, RepositoryError, RoomRepository,
    SessionRepository, Timestamp,
};

use super::{error::UseCaseError, require_current_room, require_username};

/// メッセージ投稿のユースケース
pub struct PostMessageUseCase {
    sessions: Arc<dyn SessionRepository>,
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    clock: Arc<dyn Clock>,
}

impl PostMessageUseCase {
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

    /// Append `body` to the identity's current room.
    ///
    /// # Returns
    ///
    /// * `Ok(Cursor)` - log length after the append
    /// * `Err(UseCaseError::UserNotInRoom)` - not a member; the log is untouched
    pub async fn execute(
        &self,
        identity: ClientIdentity,
        body: String,
    ) -> Result<Cursor, UseCaseError> {
        let username = require_username(self.sessions.as_ref(), &identity).await?;
        let room = require_current_room(self.presence.as_ref(), &identity).await?;

        let timestamp = Timestamp::new(self.clock.now_millis());
        match self
            .rooms
            .post(&room, &identity, username, MessageBody::new(body), timestamp)
            .await
        {
            Ok(index) => {
                tracing::debug!("{} posted to '{}' (index {})", identity, room, index);
                Ok(index)
            }
            Err(RepositoryError::RoomNotFound(_)) => {
                tracing::error!("{} is recorded in missing room '{}'", identity, room);
                self.presence.release(&identity).await;
                Err(UseCaseError::Inconsistent(format!(
                    "current room '{}' no longer exists",
                    room
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::{
        JoinRoomUseCase,
        test_support::{Fixture, identity, room_name},
    };

    fn create_usecase(fixture: &Fixture) -> PostMessageUseCase {
        PostMessageUseCase::new(
            fixture.sessions.clone(),
            fixture.rooms.clone(),
            fixture.presence.clone(),
            fixture.clock.clone(),
        )
    }

    async fn join_lobby(fixture: &Fixture, last_octet: u8) {
        JoinRoomUseCase::new(
            fixture.sessions.clone(),
            fixture.rooms.clone(),
            fixture.presence.clone(),
            fixture.clock.clone(),
        )
        .execute(identity(last_octet), "lobby".to_string())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_post_success() {
        // テスト項目: 入室中のユーザーはメッセージを投稿できる
        // given (前提条件):
        let fixture = Fixture::new().await;
        fixture.login(identity(1), "alice").await;
        join_lobby(&fixture, 1).await;
        let usecase = create_usecase(&fixture);

        // when (操作):
        let result = usecase.execute(identity(1), "hi".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(Cursor::new(2)));
        let (text, _) = fixture
            .rooms
            .fetch(&room_name("lobby"), Cursor::new(1))
            .await
            .unwrap();
        assert!(text.ends_with("alice: hi"));
    }

    #[tokio::test]
    async fn test_post_outside_room_leaves_log_unchanged() {
        // テスト項目: ルームにいないユーザーの投稿は UserNotInRoom で、ログ長は変わらない
        // given (前提条件):
        let fixture = Fixture::new().await;
        fixture.login(identity(1), "alice").await;
        fixture.login(identity(2), "bob").await;
        join_lobby(&fixture, 1).await;
        let usecase = create_usecase(&fixture);

        // when (操作):
        let result = usecase.execute(identity(2), "hi".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Err(UseCaseError::UserNotInRoom));
        assert_eq!(
            fixture.rooms.message_index(&room_name("lobby")).await,
            Ok(Cursor::new(1))
        );
    }

    #[tokio::test]
    async fn test_post_requires_session() {
        // テスト項目: ログインしていないアイデンティティは投稿できない
        // given (前提条件):
        let fixture = Fixture::new().await;
        let usecase = create_usecase(&fixture);

        // when (操作):
        let result = usecase.execute(identity(1), "hi".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Err(UseCaseError::NotLoggedIn));
    }
}
