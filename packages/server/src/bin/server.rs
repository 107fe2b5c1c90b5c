//! Room-based chat server.
//!
//! Clients send one request per TCP connection and poll for new messages.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 127.0.0.1 --port 6174 --admin-port 8080
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    infrastructure::repository::{
        InMemoryPresenceRepository, InMemoryRoomRepository, InMemorySessionRepository,
    },
    ui::{AppState, Server},
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room-based chat server with polling clients", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port number for the chat protocol
    #[arg(short = 'p', long, default_value = "6174")]
    port: u16,

    /// Room created at startup
    #[arg(long, default_value = "general")]
    default_room: String,

    /// Port number for the read-only admin HTTP API (disabled when omitted)
    #[arg(long)]
    admin_port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. UseCases (AppState)
    // 3. Default room
    // 4. Server

    // 1. Create Repositories (in-memory)
    let sessions = Arc::new(InMemorySessionRepository::new());
    let rooms = Arc::new(InMemoryRoomRepository::new());
    let presence = Arc::new(InMemoryPresenceRepository::new());

    // 2. Create UseCases
    let state = Arc::new(AppState::new(
        sessions,
        rooms,
        presence,
        Arc::new(SystemClock),
    ));

    // 3. Create the default room
    match state
        .manage_rooms_usecase
        .ensure_room(&args.default_room)
        .await
    {
        Ok(room) => tracing::info!("Room '{}' created!", room),
        Err(e) => {
            tracing::error!("Failed to create default room: {}", e);
            std::process::exit(1);
        }
    }

    // 4. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port, args.admin_port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
