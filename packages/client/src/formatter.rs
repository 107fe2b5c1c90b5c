//! Text shown to the user.

use hiroba_shared::protocol::Status;

pub const LOGIN_PROMPT: &str = "Please choose an username:";

pub const NOT_IN_ROOM_MESSAGE: &str =
    "You can't send messages if you're not in a room!\nEnter '\\help' to list available commands";

pub const JOIN_IN_ROOM_MESSAGE: &str = "You can't join a room without leaving the one you're in!";

pub const LEAVE_NO_ROOM_MESSAGE: &str = "You can't leave a room if you're not in one!";

/// Formatter for server replies and client notices
pub struct StatusFormatter;

impl StatusFormatter {
    /// Format a non-OK status as one human-readable line
    ///
    /// # Arguments
    ///
    /// * `status` - The status returned by the server
    /// * `subject` - The username or room name the request was about
    pub fn format_status(status: Status, subject: &str) -> String {
        match status {
            Status::Ok => "OK".to_string(),
            Status::InexistentRoom => format!("Room '{}' does not exist", subject),
            Status::UserNotInRoom => "You are not in a room".to_string(),
            Status::RoomAlreadyExists => format!("Room '{}' already exists", subject),
            Status::InvalidUsername => format!(
                "'{}' is not a valid username: use 2 to 32 letters, digits or underscores, starting with a letter",
                subject
            ),
            Status::UsernameExists => format!("Username '{}' is already taken", subject),
            Status::RoomNotEmpty => format!("Room '{}' still has users in it", subject),
            Status::NotLoggedIn => "You are not logged in".to_string(),
            Status::AlreadyInRoom => "You are already in a room".to_string(),
        }
    }

    pub fn format_welcome(username: &str) -> String {
        format!("Welcome, {}!", username)
    }

    pub fn format_room_welcome(room: &str) -> String {
        format!("Welcome to room {}!", room)
    }

    pub fn format_room_created(room: &str) -> String {
        format!("Room {} created", room)
    }

    pub fn format_room_deleted(room: &str) -> String {
        format!("Room {} deleted", room)
    }

    pub fn format_room_left(room: &str) -> String {
        format!("You left room {}", room)
    }

    /// Format the list of available commands
    pub fn format_help() -> String {
        [
            "Available commands:",
            "\\list - list available rooms",
            "\\list <room> - list users in a room",
            "\\join <room> - join an existing room",
            "\\leave - leave the current room",
            "\\create <room> - create a new room",
            "\\delete <room> - delete an empty room",
            "\\logout - log out and exit",
            "\\help - list available commands",
        ]
        .join("\n")
    }
}
