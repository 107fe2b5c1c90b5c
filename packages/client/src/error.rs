//! Error types for the chat client.

use hiroba_shared::{
    codec::CodecError,
    protocol::{Command, ProtocolError},
};
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server address could not be resolved or reached
    #[error("Connection error: {0}")]
    ConnectionError(#[from] std::io::Error),

    /// Request could not be written or the response could not be read
    #[error("Transport error: {0}")]
    Codec(#[from] CodecError),

    /// Response was decoded but is not a valid reply
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse { expected: Command, actual: Command },
}
