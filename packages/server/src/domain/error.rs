//! Domain-level errors.

use thiserror::Error;

use super::value_object::RoomName;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid username '{0}'")]
    InvalidUsername(String),

    #[error("username '{0}' is reserved")]
    ReservedUsername(String),

    #[error("invalid room name '{0}'")]
    InvalidRoomName(String),
}

/// Errors raised by a single room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("identity is already a member of the room")]
    AlreadyMember,

    #[error("identity is not a member of the room")]
    NotMember,

    #[error("cursor {cursor} is beyond the log length {len}")]
    CursorOutOfRange { cursor: u64, len: u64 },
}

/// Errors raised by the repositories
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("username is already taken by another identity")]
    UsernameExists,

    #[error("room '{0}' already exists")]
    RoomAlreadyExists(RoomName),

    #[error("room '{0}' does not exist")]
    RoomNotFound(RoomName),

    #[error("room '{0}' still has members")]
    RoomNotEmpty(RoomName),

    #[error("identity is already in room '{0}'")]
    AlreadyInRoom(RoomName),

    #[error(transparent)]
    Room(#[from] RoomError),
}
