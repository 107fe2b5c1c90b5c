//! Chat server library.
//!
//! Clients talk to the server one request per TCP connection and poll for new
//! messages with a cursor into the log of the room they are in.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
