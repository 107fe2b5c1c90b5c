//! Repository traits.
//!
//! The use cases depend on these interfaces only; the in-memory
//! implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::{
    ClientIdentity, Cursor, MessageBody, RepositoryError, RoomName, RoomSummary, Timestamp,
    Username,
};

/// Session registry: a two-way mapping between identities and usernames
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Bind `username` to `identity`.
    ///
    /// Fails with `UsernameExists` when another identity holds the name.
    /// A previous name of the same identity is released and returned.
    async fn login(
        &self,
        identity: ClientIdentity,
        username: Username,
    ) -> Result<Option<Username>, RepositoryError>;

    /// Remove both directions of the mapping; returns the released name
    async fn logout(&self, identity: &ClientIdentity) -> Option<Username>;

    async fn username_of(&self, identity: &ClientIdentity) -> Option<Username>;

    async fn identity_of(&self, username: &Username) -> Option<ClientIdentity>;

    /// Resolve several identities under one lock; identities without a
    /// session are skipped
    async fn usernames_of(&self, identities: &[ClientIdentity]) -> Vec<Username>;
}

/// Room directory and the operations on individual rooms
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, name: RoomName, created_at: Timestamp) -> Result<(), RepositoryError>;

    /// Remove a room; only empty rooms can be deleted
    async fn delete(&self, name: &RoomName) -> Result<(), RepositoryError>;

    /// Consistent snapshot of every room, sorted by name
    async fn list(&self) -> Vec<RoomSummary>;

    async fn summary(&self, name: &RoomName) -> Result<RoomSummary, RepositoryError>;

    async fn join(
        &self,
        name: &RoomName,
        identity: ClientIdentity,
        username: &Username,
        timestamp: Timestamp,
    ) -> Result<Cursor, RepositoryError>;

    async fn leave(
        &self,
        name: &RoomName,
        identity: &ClientIdentity,
        username: &Username,
        timestamp: Timestamp,
    ) -> Result<Cursor, RepositoryError>;

    async fn post(
        &self,
        name: &RoomName,
        identity: &ClientIdentity,
        username: Username,
        body: MessageBody,
        timestamp: Timestamp,
    ) -> Result<Cursor, RepositoryError>;

    async fn fetch(&self, name: &RoomName, cursor: Cursor)
    -> Result<(String, Cursor), RepositoryError>;

    async fn message_index(&self, name: &RoomName) -> Result<Cursor, RepositoryError>;

    async fn members(&self, name: &RoomName) -> Result<Vec<ClientIdentity>, RepositoryError>;
}

/// Which room each identity is currently in; at most one at a time
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// Record `identity` as being in `room`; fails if it already is in one
    async fn claim(&self, identity: ClientIdentity, room: RoomName)
    -> Result<(), RepositoryError>;

    async fn current(&self, identity: &ClientIdentity) -> Option<RoomName>;

    /// Forget the identity's room and return it
    async fn release(&self, identity: &ClientIdentity) -> Option<RoomName>;
}
