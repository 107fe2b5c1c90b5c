//! Parsing of interactive input lines.

use hiroba_shared::validation::{MAX_ROOM_NAME_CHARS, is_valid_room_name};

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `\list`
    ListRooms,
    /// `\list <room>`
    ListUsers(String),
    /// `\join <room>`
    Join(String),
    /// `\leave`
    Leave,
    /// `\create <room>`
    Create(String),
    /// `\delete <room>`
    Delete(String),
    /// `\logout`
    Logout,
    /// `\help`
    Help,
    /// Any line not starting with `\`
    Chat(String),
    /// Unknown command or wrong arguments, with the reason to show
    Invalid(String),
}

pub fn parse_command(line: &str) -> ClientCommand {
    let line = line.trim();
    if !line.starts_with('\\') {
        if line.is_empty() {
            return ClientCommand::Invalid("Nothing to send".to_string());
        }
        return ClientCommand::Chat(line.to_string());
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match name {
        "\\list" => match args.as_slice() {
            [] => ClientCommand::ListRooms,
            [room] => room_argument(name, room)
                .map_or_else(ClientCommand::Invalid, ClientCommand::ListUsers),
            _ => ClientCommand::Invalid(format!("Command {} takes at most one argument", name)),
        },
        "\\join" => {
            single_room(name, &args).map_or_else(ClientCommand::Invalid, ClientCommand::Join)
        }
        "\\create" => {
            single_room(name, &args).map_or_else(ClientCommand::Invalid, ClientCommand::Create)
        }
        "\\delete" => {
            single_room(name, &args).map_or_else(ClientCommand::Invalid, ClientCommand::Delete)
        }
        "\\leave" => no_arguments(name, &args, ClientCommand::Leave),
        "\\logout" => no_arguments(name, &args, ClientCommand::Logout),
        "\\help" => no_arguments(name, &args, ClientCommand::Help),
        _ => ClientCommand::Invalid(
            "Invalid command. Enter '\\help' to list available commands".to_string(),
        ),
    }
}

fn single_room(name: &str, args: &[&str]) -> Result<String, String> {
    match args {
        [] => Err(format!("Command {} requires an argument", name)),
        [room] => room_argument(name, room),
        _ => Err(format!("Command {} takes exactly one argument", name)),
    }
}

fn room_argument(name: &str, room: &str) -> Result<String, String> {
    if is_valid_room_name(room) {
        Ok(room.to_string())
    } else {
        Err(format!(
            "Command {}: room names are at most {} characters",
            name, MAX_ROOM_NAME_CHARS
        ))
    }
}

fn no_arguments(name: &str, args: &[&str], command: ClientCommand) -> ClientCommand {
    if args.is_empty() {
        command
    } else {
        ClientCommand::Invalid(format!("Command {} takes no arguments", name))
    }
}
