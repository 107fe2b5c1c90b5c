//! Connection and HTTP handlers.

mod http;
mod tcp;

pub use http::{get_room_detail, get_rooms, health_check};
pub use tcp::handle_connection;
