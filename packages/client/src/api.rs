//! Typed wrappers around the eleven chat commands.

use std::sync::Arc;

use hiroba_shared::protocol::{
    Command, Envelope, Status, decode_cursor, encode_cursor, split_fetch_payload,
};

use crate::{error::ClientError, transport::Transport};

/// Outcome of a request the server answered: the payload, or the non-OK status
pub type Reply<T> = Result<T, Status>;

#[derive(Clone)]
pub struct ChatApi {
    transport: Arc<dyn Transport>,
}

impl ChatApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn login(&self, username: &str) -> Result<Reply<()>, ClientError> {
        self.unit(Command::Login, username).await
    }

    pub async fn logout(&self) -> Result<Reply<()>, ClientError> {
        self.unit(Command::Logout, "").await
    }

    /// Rendered room list
    pub async fn list_rooms(&self) -> Result<Reply<String>, ClientError> {
        self.text(Command::ListRooms, "").await
    }

    /// Rendered member list of `room`
    pub async fn list_room_users(&self, room: &str) -> Result<Reply<String>, ClientError> {
        self.text(Command::ListRoomUsers, room).await
    }

    pub async fn create_room(&self, room: &str) -> Result<Reply<()>, ClientError> {
        self.unit(Command::CreateRoom, room).await
    }

    pub async fn delete_room(&self, room: &str) -> Result<Reply<()>, ClientError> {
        self.unit(Command::DeleteRoom, room).await
    }

    pub async fn join(&self, room: &str) -> Result<Reply<()>, ClientError> {
        self.unit(Command::Join, room).await
    }

    pub async fn leave(&self) -> Result<Reply<()>, ClientError> {
        self.unit(Command::Leave, "").await
    }

    pub async fn post(&self, body: &str) -> Result<Reply<()>, ClientError> {
        self.unit(Command::PostMessage, body).await
    }

    /// Messages from `cursor` on, and the cursor to poll with next
    pub async fn fetch(&self, cursor: u64) -> Result<Reply<(String, u64)>, ClientError> {
        match self.call(Command::FetchMessages, encode_cursor(cursor)).await? {
            Ok(payload) => Ok(Ok(split_fetch_payload(&payload)?)),
            Err(status) => Ok(Err(status)),
        }
    }

    /// Current length of the current room's log
    pub async fn message_index(&self) -> Result<Reply<u64>, ClientError> {
        match self.call(Command::GetMessageIndex, Vec::new()).await? {
            Ok(payload) => Ok(Ok(decode_cursor(&payload)?)),
            Err(status) => Ok(Err(status)),
        }
    }

    async fn unit(&self, command: Command, payload: &str) -> Result<Reply<()>, ClientError> {
        Ok(self.call(command, payload).await?.map(|_| ()))
    }

    async fn text(&self, command: Command, payload: &str) -> Result<Reply<String>, ClientError> {
        match self.call(command, payload).await? {
            Ok(payload) => Ok(Ok(String::from_utf8_lossy(&payload).into_owned())),
            Err(status) => Ok(Err(status)),
        }
    }

    async fn call(
        &self,
        command: Command,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Reply<Vec<u8>>, ClientError> {
        let response = self
            .transport
            .send(Envelope::request(command, payload))
            .await?;
        let status = response.status()?;
        tracing::debug!("{} -> {:?}", command, status);

        if status.is_ok() {
            Ok(Ok(response.payload))
        } else {
            Ok(Err(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use hiroba_shared::protocol::join_fetch_payload;

    use super::*;
    use crate::transport::MockTransport;

    fn api_with(mock: MockTransport) -> ChatApi {
        ChatApi::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_login_sends_username_payload() {
        // テスト項目: ログイン要求にユーザー名がペイロードとして載る
        // given (前提条件):
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|request| request.command == Command::Login && request.payload == b"alice")
            .times(1)
            .returning(|request| Ok(Envelope::response(request.command, Status::Ok, Vec::new())));
        let api = api_with(mock);

        // when (操作):
        let reply = api.login("alice").await.unwrap();

        // then (期待する結果):
        assert_eq!(reply, Ok(()));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_a_value() {
        // テスト項目: エラーステータスは ClientError ではなく値として返る
        // given (前提条件):
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|request| {
            Ok(Envelope::response(
                request.command,
                Status::InexistentRoom,
                Vec::new(),
            ))
        });
        let api = api_with(mock);

        // when (操作):
        let reply = api.join("ghost").await.unwrap();

        // then (期待する結果):
        assert_eq!(reply, Err(Status::InexistentRoom));
    }

    #[tokio::test]
    async fn test_fetch_splits_text_and_cursor() {
        // テスト項目: 取得結果がテキストと次のカーソルに分割される
        // given (前提条件):
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|request| request.payload == encode_cursor(3))
            .returning(|request| {
                Ok(Envelope::response(
                    request.command,
                    Status::Ok,
                    join_fetch_payload("[01/01 00:00] bob: hi", 4),
                ))
            });
        let api = api_with(mock);

        // when (操作):
        let reply = api.fetch(3).await.unwrap();

        // then (期待する結果):
        assert_eq!(reply, Ok(("[01/01 00:00] bob: hi".to_string(), 4)));
    }

    #[tokio::test]
    async fn test_message_index_decodes_cursor() {
        // テスト項目: メッセージインデックスが 8 バイトのカーソルから復元される
        // given (前提条件):
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|request| {
            Ok(Envelope::response(
                request.command,
                Status::Ok,
                encode_cursor(42).to_vec(),
            ))
        });
        let api = api_with(mock);

        // when (操作):
        let reply = api.message_index().await.unwrap();

        // then (期待する結果):
        assert_eq!(reply, Ok(42));
    }

    #[tokio::test]
    async fn test_response_without_status_is_an_error() {
        // テスト項目: ステータスのない応答はプロトコルエラーになる
        // given (前提条件):
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|request| Ok(Envelope::request(request.command, Vec::new())));
        let api = api_with(mock);

        // when (操作):
        let result = api.leave().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Protocol(_))));
    }
}
