//! Interactive chat client.
//!
//! Logs in with a username, then reads `\` commands and chat lines from the
//! terminal. While in a room, new messages are polled and printed.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client
//! cargo run --bin hiroba-client -- --server 127.0.0.1:6174 --bind 127.0.0.2
//! ```

use std::{net::IpAddr, time::Duration};

use clap::Parser;
use hiroba_client::poller::DEFAULT_POLL_INTERVAL;
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Interactive chat client with polling", long_about = None)]
struct Args {
    /// Chat server address
    #[arg(short = 's', long, default_value = "127.0.0.1:6174")]
    server: String,

    /// Local IP address to connect from
    #[arg(short = 'b', long)]
    bind: Option<IpAddr>,

    /// Interval between message fetches while in a room
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    // Run the client
    if let Err(e) = hiroba_client::run_client(
        args.server,
        args.bind,
        Duration::from_millis(args.poll_interval_ms),
    )
    .await
    {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
