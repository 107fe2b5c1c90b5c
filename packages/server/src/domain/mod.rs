//! Domain layer: value objects, entities and the repository interfaces the
//! use cases depend on.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, MessageLog, Room, RoomSummary, Sender};
pub use error::{RepositoryError, RoomError, ValueObjectError};
pub use repository::{PresenceRepository, RoomRepository, SessionRepository};
pub use value_object::{ClientIdentity, Cursor, MessageBody, RoomName, Timestamp, Username};
