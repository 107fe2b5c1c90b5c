//! UseCase errors.

use thiserror::Error;

use crate::domain::{RepositoryError, RoomError, RoomName};

/// Errors returned by the use cases
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseCaseError {
    #[error("invalid username")]
    InvalidUsername,

    #[error("username is already in use")]
    UsernameExists,

    #[error("identity has no session")]
    NotLoggedIn,

    #[error("invalid room name '{0}'")]
    InvalidRoomName(String),

    #[error("room '{0}' does not exist")]
    RoomNotFound(String),

    #[error("room '{0}' already exists")]
    RoomAlreadyExists(RoomName),

    #[error("room '{0}' still has members")]
    RoomNotEmpty(RoomName),

    #[error("identity is not in a room")]
    UserNotInRoom,

    #[error("identity is already in room '{0}'")]
    AlreadyInRoom(RoomName),

    #[error("cursor {cursor} is beyond the log length {len}")]
    CursorOutOfRange { cursor: u64, len: u64 },

    /// Shared state disagrees with itself, e.g. a recorded current room that
    /// no longer exists
    #[error("inconsistent state: {0}")]
    Inconsistent(String),
}

impl From<RepositoryError> for UseCaseError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::UsernameExists => UseCaseError::UsernameExists,
            RepositoryError::RoomAlreadyExists(name) => UseCaseError::RoomAlreadyExists(name),
            RepositoryError::RoomNotFound(name) => UseCaseError::RoomNotFound(name.to_string()),
            RepositoryError::RoomNotEmpty(name) => UseCaseError::RoomNotEmpty(name),
            RepositoryError::AlreadyInRoom(name) => UseCaseError::AlreadyInRoom(name),
            RepositoryError::Room(RoomError::NotMember) => UseCaseError::UserNotInRoom,
            RepositoryError::Room(RoomError::CursorOutOfRange { cursor, len }) => {
                UseCaseError::CursorOutOfRange { cursor, len }
            }
            RepositoryError::Room(error @ RoomError::AlreadyMember) => {
                UseCaseError::Inconsistent(error.to_string())
            }
        }
    }
}
