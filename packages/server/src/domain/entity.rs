//! Entities: chat messages, the per-room message log and the room itself.

use std::collections::HashSet;

use hiroba_shared::{time::format_message_time, validation::SYSTEM_SENDER};
use serde::Serialize;

use super::{
    error::RoomError,
    value_object::{ClientIdentity, Cursor, MessageBody, RoomName, Timestamp, Username},
};

/// Author of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Sender {
    /// Server-generated join/leave notices
    System,
    User(Username),
}

impl Sender {
    pub fn as_str(&self) -> &str {
        match self {
            Sender::System => SYSTEM_SENDER,
            Sender::User(username) => username.as_str(),
        }
    }
}

/// Immutable chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub body: MessageBody,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(sender: Sender, body: MessageBody, timestamp: Timestamp) -> Self {
        Self {
            sender,
            body,
            timestamp,
        }
    }

    /// Render as `[dd/mm HH:MM] sender: body`
    pub fn render(&self) -> String {
        format!(
            "[{}] {}: {}",
            format_message_time(self.timestamp.value()),
            self.sender.as_str(),
            self.body.as_str()
        )
    }
}

/// Append-only sequence of messages; positions never change once assigned
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return the new length
    pub fn append(&mut self, message: ChatMessage) -> Cursor {
        self.messages.push(message);
        self.len()
    }

    /// Current index, i.e. the number of messages in the log
    pub fn len(&self) -> Cursor {
        Cursor::new(self.messages.len() as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages with index in `[cursor, len)`
    pub fn range_from(&self, cursor: Cursor) -> Result<&[ChatMessage], RoomError> {
        let len = self.len();
        if cursor > len {
            return Err(RoomError::CursorOutOfRange {
                cursor: cursor.value(),
                len: len.value(),
            });
        }
        Ok(&self.messages[cursor.value() as usize..])
    }
}

/// Snapshot of a room for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub name: RoomName,
    pub member_count: usize,
    pub message_count: u64,
    pub created_at: Timestamp,
}

impl RoomSummary {
    /// Render as `<room> - <n> users online`
    pub fn render(&self) -> String {
        format!("{} - {} users online", self.name, self.member_count)
    }
}

/// A chat room: its member set and its message log.
///
/// Both live behind a single lock in the directory, so a member count, the
/// member set and the log length are always observed together.
#[derive(Debug, Clone)]
pub struct Room {
    pub name: RoomName,
    pub created_at: Timestamp,
    members: HashSet<ClientIdentity>,
    log: MessageLog,
    closed: bool,
}

impl Room {
    pub fn new(name: RoomName, created_at: Timestamp) -> Self {
        Self {
            name,
            created_at,
            members: HashSet::new(),
            log: MessageLog::new(),
            closed: false,
        }
    }

    /// Add a member and append the join notice
    pub fn join(
        &mut self,
        identity: ClientIdentity,
        username: &Username,
        timestamp: Timestamp,
    ) -> Result<Cursor, RoomError> {
        if !self.members.insert(identity) {
            return Err(RoomError::AlreadyMember);
        }
        let notice = format!("{} has joined the room.", username);
        Ok(self.log.append(ChatMessage::new(
            Sender::System,
            MessageBody::new(notice),
            timestamp,
        )))
    }

    /// Remove a member and append the leave notice
    pub fn leave(
        &mut self,
        identity: &ClientIdentity,
        username: &Username,
        timestamp: Timestamp,
    ) -> Result<Cursor, RoomError> {
        if !self.members.remove(identity) {
            return Err(RoomError::NotMember);
        }
        let notice = format!("{} has left the room.", username);
        Ok(self.log.append(ChatMessage::new(
            Sender::System,
            MessageBody::new(notice),
            timestamp,
        )))
    }

    /// Append a user message; only members may post
    pub fn post(
        &mut self,
        identity: &ClientIdentity,
        username: Username,
        body: MessageBody,
        timestamp: Timestamp,
    ) -> Result<Cursor, RoomError> {
        if !self.members.contains(identity) {
            return Err(RoomError::NotMember);
        }
        Ok(self
            .log
            .append(ChatMessage::new(Sender::User(username), body, timestamp)))
    }

    /// Render every message from `cursor` on, one per line, with the new cursor
    pub fn fetch(&self, cursor: Cursor) -> Result<(String, Cursor), RoomError> {
        let rendered = self
            .log
            .range_from(cursor)?
            .iter()
            .map(ChatMessage::render)
            .collect::<Vec<_>>()
            .join("\n");
        Ok((rendered, self.log.len()))
    }

    pub fn message_index(&self) -> Cursor {
        self.log.len()
    }

    pub fn is_member(&self, identity: &ClientIdentity) -> bool {
        self.members.contains(identity)
    }

    /// Members sorted by identity
    pub fn members(&self) -> Vec<ClientIdentity> {
        let mut members: Vec<ClientIdentity> = self.members.iter().copied().collect();
        members.sort();
        members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            member_count: self.member_count(),
            message_count: self.log.len().value(),
            created_at: self.created_at,
        }
    }

    /// Mark the room as removed from the directory
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
