//! Integration tests for the admin HTTP API.

use std::{net::SocketAddr, sync::Arc};

use hiroba_server::{
    infrastructure::dto::http::{HealthDto, RoomDetailDto, RoomSummaryDto},
    ui::{AppState, admin_router},
};
use hiroba_shared::time::FixedClock;
use reqwest::StatusCode;
use tokio::{net::TcpListener, task::JoinHandle};

const NOW: i64 = 1672498800000;

/// Helper struct to manage an in-process admin API
struct TestAdminServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    task: JoinHandle<()>,
}

impl TestAdminServer {
    /// Start the admin API on an ephemeral port with a "general" room
    async fn start() -> Self {
        let state = Arc::new(AppState::in_memory(Arc::new(FixedClock::new(NOW))));
        state
            .manage_rooms_usecase
            .ensure_room("general")
            .await
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = admin_router(state.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state, task }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestAdminServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックがルーム数とともに ok を返す
    // given (前提条件):
    let server = TestAdminServer::start().await;

    // when (操作):
    let health: HealthDto = reqwest::get(server.url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health.status, "ok");
    assert_eq!(health.rooms, 1);
}

#[tokio::test]
async fn test_get_rooms() {
    // テスト項目: ルーム一覧が名前順に返る
    // given (前提条件):
    let server = TestAdminServer::start().await;
    server
        .state
        .manage_rooms_usecase
        .ensure_room("games")
        .await
        .unwrap();

    // when (操作):
    let rooms: Vec<RoomSummaryDto> = reqwest::get(server.url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    let names: Vec<&str> = rooms.iter().map(|room| room.name.as_str()).collect();
    assert_eq!(names, vec!["games", "general"]);
    assert_eq!(rooms[1].member_count, 0);
    assert_eq!(rooms[1].message_count, 0);
    assert_eq!(rooms[1].created_at, "2022-12-31T15:00:00.000Z");
}

#[tokio::test]
async fn test_get_room_detail() {
    // テスト項目: ルーム詳細に参加者名とメッセージインデックスが含まれる
    // given (前提条件):
    let server = TestAdminServer::start().await;
    let identity = "10.0.0.1".parse::<std::net::IpAddr>().unwrap().into();
    server
        .state
        .login_usecase
        .execute(identity, "alice".to_string())
        .await
        .unwrap();
    server
        .state
        .join_room_usecase
        .execute(identity, "general".to_string())
        .await
        .unwrap();

    // when (操作):
    let detail: RoomDetailDto = reqwest::get(server.url("/api/rooms/general"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(detail.name, "general");
    assert_eq!(detail.members, vec!["alice"]);
    assert_eq!(detail.message_index, 1);
}

#[tokio::test]
async fn test_get_missing_room_is_not_found() {
    // テスト項目: 存在しないルームの詳細は 404 になる
    // given (前提条件):
    let server = TestAdminServer::start().await;

    // when (操作):
    let response = reqwest::get(server.url("/api/rooms/ghost")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
