//! Username and room name rules shared by client and server.

use std::sync::LazyLock;

use regex::Regex;

/// Sender name reserved for server-generated notices
pub const SYSTEM_SENDER: &str = "server";

pub const MAX_ROOM_NAME_CHARS: usize = 64;

static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]{1,31}$").expect("username regex is valid")
});

/// Check a requested username against the shared syntax rule.
///
/// Two to 32 characters, starting with an ASCII letter, followed by ASCII
/// letters, digits or underscores.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// Room names are 1 to 64 characters without whitespace
pub fn is_valid_room_name(name: &str) -> bool {
    let chars = name.chars().count();
    chars > 0 && chars <= MAX_ROOM_NAME_CHARS && !name.chars().any(char::is_whitespace)
}
