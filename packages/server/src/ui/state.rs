//! Shared application state.

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::{
    domain::{PresenceRepository, RoomRepository, SessionRepository},
    infrastructure::repository::{
        InMemoryPresenceRepository, InMemoryRoomRepository, InMemorySessionRepository,
    },
    usecase::{
        FetchMessagesUseCase, JoinRoomUseCase, LeaveRoomUseCase, LoginUseCase, LogoutUseCase,
        ManageRoomsUseCase, PostMessageUseCase,
    },
};

/// Shared application state: every use case, wired to one set of repositories.
///
/// Constructed once at startup and shared by the dispatcher and the admin
/// API; there is no process-global state.
pub struct AppState {
    pub login_usecase: LoginUseCase,
    pub logout_usecase: LogoutUseCase,
    pub join_room_usecase: JoinRoomUseCase,
    pub leave_room_usecase: LeaveRoomUseCase,
    pub post_message_usecase: PostMessageUseCase,
    pub fetch_messages_usecase: FetchMessagesUseCase,
    pub manage_rooms_usecase: ManageRoomsUseCase,
}

impl AppState {
    /// Wire the use cases to the given repositories
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let leave_room_usecase = LeaveRoomUseCase::new(
            sessions.clone(),
            rooms.clone(),
            presence.clone(),
            clock.clone(),
        );

        Self {
            login_usecase: LoginUseCase::new(sessions.clone()),
            logout_usecase: LogoutUseCase::new(
                sessions.clone(),
                presence.clone(),
                leave_room_usecase.clone(),
            ),
            join_room_usecase: JoinRoomUseCase::new(
                sessions.clone(),
                rooms.clone(),
                presence.clone(),
                clock.clone(),
            ),
            leave_room_usecase,
            post_message_usecase: PostMessageUseCase::new(
                sessions.clone(),
                rooms.clone(),
                presence.clone(),
                clock.clone(),
            ),
            fetch_messages_usecase: FetchMessagesUseCase::new(
                sessions.clone(),
                rooms.clone(),
                presence,
            ),
            manage_rooms_usecase: ManageRoomsUseCase::new(sessions, rooms, clock),
        }
    }

    /// Fresh in-memory repositories
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(InMemoryPresenceRepository::new()),
            clock,
        )
    }
}
