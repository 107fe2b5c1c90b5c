//! In-memory repositories guarded by `tokio::sync::Mutex`.
//!
//! Lock order: directory before room. Session and presence locks are never
//! held together with any other lock.

mod presence;
mod room;
mod session;

pub use presence::InMemoryPresenceRepository;
pub use room::InMemoryRoomRepository;
pub use session::InMemorySessionRepository;
