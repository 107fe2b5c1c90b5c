//! UseCase layer: one struct per operation, depending only on the
//! repository traits of the domain layer.

mod error;
mod fetch_messages;
mod join_room;
mod leave_room;
mod login;
mod logout;
mod manage_rooms;
mod post_message;

pub use error::UseCaseError;
pub use fetch_messages::FetchMessagesUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
pub use manage_rooms::{ManageRoomsUseCase, RoomUsers};
pub use post_message::PostMessageUseCase;

use crate::domain::{ClientIdentity, PresenceRepository, RoomName, SessionRepository, Username};

/// Username bound to `identity`, or `NotLoggedIn`
async fn require_username(
    sessions: &dyn SessionRepository,
    identity: &ClientIdentity,
) -> Result<Username, UseCaseError> {
    sessions
        .username_of(identity)
        .await
        .ok_or(UseCaseError::NotLoggedIn)
}

/// Room the identity is currently in, or `UserNotInRoom`
async fn require_current_room(
    presence: &dyn PresenceRepository,
    identity: &ClientIdentity,
) -> Result<RoomName, UseCaseError> {
    presence
        .current(identity)
        .await
        .ok_or(UseCaseError::UserNotInRoom)
}
