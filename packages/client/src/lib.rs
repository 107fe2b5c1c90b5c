//! Chat client library.
//!
//! Every request travels on its own TCP connection; new messages are pulled
//! by a poller while the user is in a room.

pub mod api;
pub mod command;
pub mod error;
pub mod formatter;
pub mod poller;
pub mod runner;
pub mod session;
pub mod transport;

pub use runner::run_client;
