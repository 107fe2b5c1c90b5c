//! Request dispatcher.
//!
//! Maps one request envelope to one response envelope. The connection
//! handler writes the response back; a `DispatchError` closes the
//! connection without writing anything.

use std::sync::Arc;

use hiroba_shared::protocol::{
    Command, Envelope, Status, decode_cursor, encode_cursor, join_fetch_payload,
};
use thiserror::Error;

use crate::{
    domain::{ClientIdentity, Cursor, RoomSummary},
    usecase::{RoomUsers, UseCaseError},
};

use super::state::AppState;

/// Reasons to drop a connection without replying
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The request itself is malformed
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Shared state was found inconsistent while serving the request
    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

pub struct Dispatcher {
    state: Arc<AppState>,
}

impl Dispatcher {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Serve one request on behalf of `identity`
    pub async fn dispatch(
        &self,
        identity: ClientIdentity,
        request: Envelope,
    ) -> Result<Envelope, DispatchError> {
        let command = request.command;
        let outcome = self.execute(identity, &request).await?;

        match outcome {
            Ok(payload) => Ok(Envelope::response(command, Status::Ok, payload)),
            Err(error) => {
                let status = status_for(error)?;
                tracing::debug!("{} {} -> {:?}", identity, command, status);
                Ok(Envelope::response(command, status, Vec::new()))
            }
        }
    }

    async fn execute(
        &self,
        identity: ClientIdentity,
        request: &Envelope,
    ) -> Result<Result<Vec<u8>, UseCaseError>, DispatchError> {
        let state = &self.state;

        let outcome = match request.command {
            Command::Login => {
                let name = text(request)?;
                state
                    .login_usecase
                    .execute(identity, name)
                    .await
                    .map(|_| Vec::new())
            }
            // Acknowledged even without a session
            Command::Logout => state
                .logout_usecase
                .execute(identity)
                .await
                .map(|()| Vec::new()),
            Command::ListRooms => state
                .manage_rooms_usecase
                .list(identity)
                .await
                .map(|rooms| render_room_list(&rooms).into_bytes()),
            Command::ListRoomUsers => {
                let room = text(request)?;
                state
                    .manage_rooms_usecase
                    .list_users(identity, room)
                    .await
                    .map(|users| render_room_users(&users).into_bytes())
            }
            Command::CreateRoom => {
                let room = text(request)?;
                state
                    .manage_rooms_usecase
                    .create(identity, room)
                    .await
                    .map(|()| Vec::new())
            }
            Command::DeleteRoom => {
                let room = text(request)?;
                state
                    .manage_rooms_usecase
                    .delete(identity, room)
                    .await
                    .map(|()| Vec::new())
            }
            Command::Join => {
                let room = text(request)?;
                state
                    .join_room_usecase
                    .execute(identity, room)
                    .await
                    .map(|_| Vec::new())
            }
            Command::Leave => state
                .leave_room_usecase
                .execute(identity)
                .await
                .map(|_| Vec::new()),
            Command::PostMessage => {
                let body = text(request)?;
                state
                    .post_message_usecase
                    .execute(identity, body)
                    .await
                    .map(|_| Vec::new())
            }
            Command::FetchMessages => {
                let cursor = decode_cursor(&request.payload)
                    .map_err(|e| DispatchError::Protocol(e.to_string()))?;
                state
                    .fetch_messages_usecase
                    .fetch(identity, Cursor::new(cursor))
                    .await
                    .map(|(text, next)| join_fetch_payload(&text, next.value()))
            }
            Command::GetMessageIndex => state
                .fetch_messages_usecase
                .message_index(identity)
                .await
                .map(|index| encode_cursor(index.value()).to_vec()),
        };

        Ok(outcome)
    }
}

fn text(request: &Envelope) -> Result<String, DispatchError> {
    request
        .payload_text()
        .map(str::to_string)
        .map_err(|e| DispatchError::Protocol(format!("{} payload: {}", request.command, e)))
}

/// Status reported for a failed operation, or the reason to drop the connection
fn status_for(error: UseCaseError) -> Result<Status, DispatchError> {
    let status = match error {
        UseCaseError::InvalidUsername => Status::InvalidUsername,
        UseCaseError::UsernameExists => Status::UsernameExists,
        UseCaseError::NotLoggedIn => Status::NotLoggedIn,
        UseCaseError::RoomNotFound(_) => Status::InexistentRoom,
        UseCaseError::RoomAlreadyExists(_) => Status::RoomAlreadyExists,
        UseCaseError::RoomNotEmpty(_) => Status::RoomNotEmpty,
        UseCaseError::UserNotInRoom => Status::UserNotInRoom,
        UseCaseError::AlreadyInRoom(_) => Status::AlreadyInRoom,
        error @ (UseCaseError::InvalidRoomName(_) | UseCaseError::CursorOutOfRange { .. }) => {
            return Err(DispatchError::Protocol(error.to_string()));
        }
        UseCaseError::Inconsistent(reason) => return Err(DispatchError::Inconsistent(reason)),
    };
    Ok(status)
}

/// `<room> - <n> users online` per room, or `There are no rooms`
pub fn render_room_list(rooms: &[RoomSummary]) -> String {
    if rooms.is_empty() {
        return "There are no rooms".to_string();
    }
    rooms
        .iter()
        .map(RoomSummary::render)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_room_users(users: &RoomUsers) -> String {
    if users.usernames.is_empty() {
        return format!("There are no users in {}", users.room);
    }
    let mut lines = vec![format!("List of users in {}", users.room)];
    lines.extend(users.usernames.iter().map(|name| name.as_str().to_string()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use hiroba_shared::{
        protocol::split_fetch_payload,
        time::{FixedClock, format_message_time},
    };

    use super::*;

    const NOW: i64 = 1672498800000;

    async fn dispatcher() -> Dispatcher {
        let state = AppState::in_memory(Arc::new(FixedClock::new(NOW)));
        state
            .manage_rooms_usecase
            .ensure_room("general")
            .await
            .unwrap();
        Dispatcher::new(Arc::new(state))
    }

    fn identity(last_octet: u8) -> ClientIdentity {
        ClientIdentity::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)))
    }

    async fn send(
        dispatcher: &Dispatcher,
        identity: ClientIdentity,
        command: Command,
        payload: impl Into<Vec<u8>>,
    ) -> Envelope {
        dispatcher
            .dispatch(identity, Envelope::request(command, payload))
            .await
            .unwrap()
    }

    async fn status(
        dispatcher: &Dispatcher,
        identity: ClientIdentity,
        command: Command,
        payload: impl Into<Vec<u8>>,
    ) -> Status {
        send(dispatcher, identity, command, payload)
            .await
            .status()
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_statuses() {
        // テスト項目: ログインの成否がステータスコードで返る
        // given (前提条件):
        let dispatcher = dispatcher().await;

        // when (操作):
        let ok = status(&dispatcher, identity(1), Command::Login, "alice").await;
        let taken = status(&dispatcher, identity(2), Command::Login, "alice").await;
        let invalid = status(&dispatcher, identity(3), Command::Login, "1abc").await;
        let reserved = status(&dispatcher, identity(3), Command::Login, "server").await;

        // then (期待する結果):
        assert_eq!(ok, Status::Ok);
        assert_eq!(taken, Status::UsernameExists);
        assert_eq!(invalid, Status::InvalidUsername);
        assert_eq!(reserved, Status::InvalidUsername);
    }

    #[tokio::test]
    async fn test_commands_require_login() {
        // テスト項目: ログイン前のコマンドは NotLoggedIn になる
        // given (前提条件):
        let dispatcher = dispatcher().await;

        // when (操作):
        let list = status(&dispatcher, identity(1), Command::ListRooms, "").await;
        let join = status(&dispatcher, identity(1), Command::Join, "general").await;
        let index = status(&dispatcher, identity(1), Command::GetMessageIndex, "").await;

        // then (期待する結果):
        assert_eq!(list, Status::NotLoggedIn);
        assert_eq!(join, Status::NotLoggedIn);
        assert_eq!(index, Status::NotLoggedIn);
    }

    #[tokio::test]
    async fn test_join_post_fetch_flow() {
        // テスト項目: 参加・投稿・取得の一連の流れでカーソルが進む
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, alice, Command::Join, "general").await;
        let index = send(&dispatcher, alice, Command::GetMessageIndex, "").await;
        let baseline = decode_cursor(&index.payload).unwrap();

        // when (操作):
        let posted = status(&dispatcher, alice, Command::PostMessage, "hello").await;
        let fetched = send(
            &dispatcher,
            alice,
            Command::FetchMessages,
            encode_cursor(baseline).to_vec(),
        )
        .await;

        // then (期待する結果):
        assert_eq!(baseline, 1);
        assert_eq!(posted, Status::Ok);
        assert_eq!(fetched.status(), Ok(Status::Ok));
        let (text, cursor) = split_fetch_payload(&fetched.payload).unwrap();
        assert_eq!(text, format!("[{}] alice: hello", format_message_time(NOW)));
        assert_eq!(cursor, 2);
    }

    #[tokio::test]
    async fn test_fetch_at_end_is_empty() {
        // テスト項目: ログ末尾のカーソルでは空のテキストと同じカーソルが返る
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, alice, Command::Join, "general").await;

        // when (操作):
        let fetched = send(
            &dispatcher,
            alice,
            Command::FetchMessages,
            encode_cursor(1).to_vec(),
        )
        .await;

        // then (期待する結果):
        assert_eq!(split_fetch_payload(&fetched.payload), Ok((String::new(), 1)));
    }

    #[tokio::test]
    async fn test_cursor_beyond_log_drops_connection() {
        // テスト項目: ログ長を超えるカーソルはプロトコルエラーになる
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, alice, Command::Join, "general").await;

        // when (操作):
        let result = dispatcher
            .dispatch(
                alice,
                Envelope::request(Command::FetchMessages, encode_cursor(99).to_vec()),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(DispatchError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_malformed_cursor_drops_connection() {
        // テスト項目: 8 バイトでないカーソルはプロトコルエラーになる
        // given (前提条件):
        let dispatcher = dispatcher().await;

        // when (操作):
        let result = dispatcher
            .dispatch(
                identity(1),
                Envelope::request(Command::FetchMessages, vec![1, 2, 3]),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(DispatchError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_room_lifecycle_statuses() {
        // テスト項目: ルームの作成・重複・削除・存在しないルームへの参加のステータス
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;

        // when (操作):
        let created = status(&dispatcher, alice, Command::CreateRoom, "games").await;
        let duplicate = status(&dispatcher, alice, Command::CreateRoom, "games").await;
        let deleted = status(&dispatcher, alice, Command::DeleteRoom, "games").await;
        let join_deleted = status(&dispatcher, alice, Command::Join, "games").await;

        // then (期待する結果):
        assert_eq!(created, Status::Ok);
        assert_eq!(duplicate, Status::RoomAlreadyExists);
        assert_eq!(deleted, Status::Ok);
        assert_eq!(join_deleted, Status::InexistentRoom);
    }

    #[tokio::test]
    async fn test_delete_occupied_room_is_refused() {
        // テスト項目: 参加者のいるルームは削除できない
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        let bob = identity(2);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, bob, Command::Login, "bob").await;
        status(&dispatcher, alice, Command::Join, "general").await;

        // when (操作):
        let result = status(&dispatcher, bob, Command::DeleteRoom, "general").await;

        // then (期待する結果):
        assert_eq!(result, Status::RoomNotEmpty);
    }

    #[tokio::test]
    async fn test_room_scoped_commands_outside_room() {
        // テスト項目: ルーム外での投稿・退出・取得は UserNotInRoom になる
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;

        // when (操作):
        let post = status(&dispatcher, alice, Command::PostMessage, "hi").await;
        let leave = status(&dispatcher, alice, Command::Leave, "").await;
        let fetch = status(
            &dispatcher,
            alice,
            Command::FetchMessages,
            encode_cursor(0).to_vec(),
        )
        .await;

        // then (期待する結果):
        assert_eq!(post, Status::UserNotInRoom);
        assert_eq!(leave, Status::UserNotInRoom);
        assert_eq!(fetch, Status::UserNotInRoom);
    }

    #[tokio::test]
    async fn test_join_twice_is_refused() {
        // テスト項目: 既にルームにいる状態での参加は AlreadyInRoom になる
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, alice, Command::CreateRoom, "games").await;
        status(&dispatcher, alice, Command::Join, "general").await;

        // when (操作):
        let result = status(&dispatcher, alice, Command::Join, "games").await;

        // then (期待する結果):
        assert_eq!(result, Status::AlreadyInRoom);
    }

    #[tokio::test]
    async fn test_list_rooms_and_users_text() {
        // テスト項目: ルーム一覧と参加者一覧のテキスト表現
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        let bob = identity(2);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, bob, Command::Login, "bob").await;
        status(&dispatcher, alice, Command::CreateRoom, "games").await;
        status(&dispatcher, bob, Command::Join, "general").await;
        status(&dispatcher, alice, Command::Join, "general").await;

        // when (操作):
        let rooms = send(&dispatcher, alice, Command::ListRooms, "").await;
        let users = send(&dispatcher, alice, Command::ListRoomUsers, "general").await;
        let empty = send(&dispatcher, alice, Command::ListRoomUsers, "games").await;
        let missing = status(&dispatcher, alice, Command::ListRoomUsers, "ghost").await;

        // then (期待する結果):
        assert_eq!(
            rooms.payload_text(),
            Ok("games - 0 users online\ngeneral - 2 users online")
        );
        assert_eq!(
            users.payload_text(),
            Ok("List of users in general\nalice\nbob")
        );
        assert_eq!(empty.payload_text(), Ok("There are no users in games"));
        assert_eq!(missing, Status::InexistentRoom);
    }

    #[tokio::test]
    async fn test_logout_is_always_ok_and_leaves_room() {
        // テスト項目: ログアウトは常に OK で、参加中のルームからも退出する
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        let bob = identity(2);
        status(&dispatcher, alice, Command::Login, "alice").await;
        status(&dispatcher, bob, Command::Login, "bob").await;
        status(&dispatcher, alice, Command::Join, "general").await;

        // when (操作):
        let first = status(&dispatcher, alice, Command::Logout, "").await;
        let second = status(&dispatcher, alice, Command::Logout, "").await;
        let users = send(&dispatcher, bob, Command::ListRoomUsers, "general").await;
        let relogin = status(&dispatcher, identity(3), Command::Login, "alice").await;

        // then (期待する結果):
        assert_eq!(first, Status::Ok);
        assert_eq!(second, Status::Ok);
        assert_eq!(users.payload_text(), Ok("There are no users in general"));
        assert_eq!(relogin, Status::Ok);
    }

    #[tokio::test]
    async fn test_invalid_utf8_payload_drops_connection() {
        // テスト項目: UTF-8 でないテキストペイロードはプロトコルエラーになる
        // given (前提条件):
        let dispatcher = dispatcher().await;

        // when (操作):
        let result = dispatcher
            .dispatch(identity(1), Envelope::request(Command::Login, vec![0xff, 0xfe]))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(DispatchError::Protocol(_))));
    }

    #[test]
    fn test_render_empty_room_list() {
        // テスト項目: ルームがない場合の一覧表示
        // given (前提条件):
        let rooms: Vec<RoomSummary> = Vec::new();

        // when (操作):
        let text = render_room_list(&rooms);

        // then (期待する結果):
        assert_eq!(text, "There are no rooms");
    }

    #[tokio::test]
    async fn test_room_lifecycle_end_to_end() {
        // テスト項目: 作成・参加・投稿・取得・退出・削除の一連の流れが成立する
        // given (前提条件):
        let dispatcher = dispatcher().await;
        let alice = identity(1);
        status(&dispatcher, alice, Command::Login, "alice").await;

        // when (操作): 作成して参加する
        let created = status(&dispatcher, alice, Command::CreateRoom, "lobby").await;
        let joined = status(&dispatcher, alice, Command::Join, "lobby").await;
        let after_join = send(&dispatcher, alice, Command::GetMessageIndex, "").await;

        // then (期待する結果): 参加通知の 1 件だけが記録されている
        assert_eq!(created, Status::Ok);
        assert_eq!(joined, Status::Ok);
        assert_eq!(decode_cursor(&after_join.payload), Ok(1));

        // when (操作): 投稿して先頭から取得する
        let posted = status(&dispatcher, alice, Command::PostMessage, "hello").await;
        let after_post = send(&dispatcher, alice, Command::GetMessageIndex, "").await;
        let fetched = send(
            &dispatcher,
            alice,
            Command::FetchMessages,
            encode_cursor(0).to_vec(),
        )
        .await;

        // then (期待する結果): 2 行のテキストとカーソル 2 が返る
        assert_eq!(posted, Status::Ok);
        assert_eq!(decode_cursor(&after_post.payload), Ok(2));
        let (text, cursor) = split_fetch_payload(&fetched.payload).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("server: alice has joined the room."));
        assert!(lines[1].ends_with("alice: hello"));
        assert_eq!(cursor, 2);

        // when (操作): 退出する
        let left = status(&dispatcher, alice, Command::Leave, "").await;

        // then (期待する結果): 退出通知が追加され、参加者はいない
        assert_eq!(left, Status::Ok);
        let rooms = dispatcher.state.manage_rooms_usecase.snapshot().await;
        let lobby = rooms
            .iter()
            .find(|room| room.name.as_str() == "lobby")
            .unwrap();
        assert_eq!(lobby.message_count, 3);
        assert_eq!(lobby.member_count, 0);

        // when (操作): 空になったルームを削除する
        let deleted = status(&dispatcher, alice, Command::DeleteRoom, "lobby").await;

        // then (期待する結果):
        assert_eq!(deleted, Status::Ok);
    }
}
