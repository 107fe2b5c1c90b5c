//! Value objects of the chat domain.

use std::{fmt, net::IpAddr};

use hiroba_shared::validation::{SYSTEM_SENDER, is_valid_room_name, is_valid_username};
use serde::Serialize;

use super::error::ValueObjectError;

/// Network origin of a connection, used to correlate requests with a session.
///
/// Only the peer IP takes part: every request arrives on a fresh connection
/// with a new ephemeral port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClientIdentity(IpAddr);

impl ClientIdentity {
    pub fn new(addr: IpAddr) -> Self {
        Self(addr)
    }
}

impl From<IpAddr> for ClientIdentity {
    fn from(addr: IpAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated username; the system sender name is never a valid username
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value == SYSTEM_SENDER {
            return Err(ValueObjectError::ReservedUsername(value));
        }
        if !is_valid_username(&value) {
            return Err(ValueObjectError::InvalidUsername(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room name: 1 to 64 characters without whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if !is_valid_room_name(&value) {
            return Err(ValueObjectError::InvalidRoomName(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body text of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBody(String);

impl MessageBody {
    /// Line breaks are replaced with spaces; a message is always one line
    pub fn new(value: String) -> Self {
        Self(value.replace(['\r', '\n'], " "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageBody {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Position in a room's message log; equals the number of messages consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Cursor(u64);

impl Cursor {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
