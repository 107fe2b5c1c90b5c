//! Shared library for the Hiroba chat server and client.
//!
//! Holds the wire envelope, its codec, the username rule both sides agree on,
//! and small time and logging helpers.

pub mod codec;
pub mod logger;
pub mod protocol;
pub mod time;
pub mod validation;
