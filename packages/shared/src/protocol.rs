//! Wire envelope exchanged between client and server.
//!
//! Every connection carries exactly one request envelope and one response
//! envelope. Commands and statuses travel as integer codes; the payload is
//! raw bytes whose meaning depends on the command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the little-endian cursor carried by fetch and index payloads
pub const CURSOR_LEN: usize = 8;

/// Request command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Command {
    Login = 1,
    ListRooms = 2,
    Join = 3,
    PostMessage = 4,
    FetchMessages = 5,
    GetMessageIndex = 6,
    Leave = 7,
    CreateRoom = 8,
    Logout = 9,
    ListRoomUsers = 10,
    DeleteRoom = 11,
}

impl Command {
    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Login => "login",
            Command::ListRooms => "list-rooms",
            Command::Join => "join",
            Command::PostMessage => "post-message",
            Command::FetchMessages => "fetch-messages",
            Command::GetMessageIndex => "get-message-index",
            Command::Leave => "leave",
            Command::CreateRoom => "create-room",
            Command::Logout => "logout",
            Command::ListRoomUsers => "list-room-users",
            Command::DeleteRoom => "delete-room",
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let command = match code {
            1 => Command::Login,
            2 => Command::ListRooms,
            3 => Command::Join,
            4 => Command::PostMessage,
            5 => Command::FetchMessages,
            6 => Command::GetMessageIndex,
            7 => Command::Leave,
            8 => Command::CreateRoom,
            9 => Command::Logout,
            10 => Command::ListRoomUsers,
            11 => Command::DeleteRoom,
            other => return Err(ProtocolError::UnknownCommand(other)),
        };
        Ok(command)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Status {
    Ok = 1,
    InexistentRoom = 2,
    UserNotInRoom = 3,
    RoomAlreadyExists = 4,
    InvalidUsername = 5,
    UsernameExists = 6,
    RoomNotEmpty = 7,
    NotLoggedIn = 8,
    AlreadyInRoom = 9,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for Status {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let status = match code {
            1 => Status::Ok,
            2 => Status::InexistentRoom,
            3 => Status::UserNotInRoom,
            4 => Status::RoomAlreadyExists,
            5 => Status::InvalidUsername,
            6 => Status::UsernameExists,
            7 => Status::RoomNotEmpty,
            8 => Status::NotLoggedIn,
            9 => Status::AlreadyInRoom,
            other => return Err(ProtocolError::UnknownStatus(other)),
        };
        Ok(status)
    }
}

/// Protocol-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown command code {0}")]
    UnknownCommand(u8),

    #[error("unknown status code {0}")]
    UnknownStatus(u8),

    #[error("cursor payload must be {CURSOR_LEN} bytes, got {0}")]
    InvalidCursorLength(usize),

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("response carries no status")]
    MissingStatus,
}

/// One request or response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub command: Command,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Build a request with the given payload
    pub fn request(command: Command, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            status: None,
            payload: payload.into(),
        }
    }

    /// Build a response echoing the request command
    pub fn response(command: Command, status: Status, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            status: Some(status),
            payload: payload.into(),
        }
    }

    /// Response status, or an error when the envelope is a request
    pub fn status(&self) -> Result<Status, ProtocolError> {
        self.status.ok_or(ProtocolError::MissingStatus)
    }

    /// Payload decoded as UTF-8 text
    pub fn payload_text(&self) -> Result<&str, ProtocolError> {
        std::str::from_utf8(&self.payload).map_err(|_| ProtocolError::InvalidUtf8)
    }
}

/// Encode a cursor as 8 little-endian bytes
pub fn encode_cursor(cursor: u64) -> [u8; CURSOR_LEN] {
    cursor.to_le_bytes()
}

/// Decode a cursor payload; the payload must be exactly 8 bytes
pub fn decode_cursor(payload: &[u8]) -> Result<u64, ProtocolError> {
    let bytes: [u8; CURSOR_LEN] = payload
        .try_into()
        .map_err(|_| ProtocolError::InvalidCursorLength(payload.len()))?;
    Ok(u64::from_le_bytes(bytes))
}

/// Concatenate rendered message text and the trailing cursor
pub fn join_fetch_payload(text: &str, cursor: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(text.len() + CURSOR_LEN);
    payload.extend_from_slice(text.as_bytes());
    payload.extend_from_slice(&encode_cursor(cursor));
    payload
}

/// Split a fetch response payload into its text and the trailing cursor
pub fn split_fetch_payload(payload: &[u8]) -> Result<(String, u64), ProtocolError> {
    if payload.len() < CURSOR_LEN {
        return Err(ProtocolError::InvalidCursorLength(payload.len()));
    }
    let (text, cursor) = payload.split_at(payload.len() - CURSOR_LEN);
    let text = std::str::from_utf8(text).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok((text.to_string(), decode_cursor(cursor)?))
}
