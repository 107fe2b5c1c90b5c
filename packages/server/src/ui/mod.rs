//! UI layer: the request dispatcher, the TCP server and the admin HTTP API.

mod dispatcher;
mod handler;
mod server;
mod signal;
mod state;

pub use dispatcher::{DispatchError, Dispatcher, render_room_list, render_room_users};
pub use server::{Server, admin_router};
pub use state::AppState;
