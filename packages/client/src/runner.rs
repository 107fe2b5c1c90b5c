//! Client execution logic.

use std::{net::IpAddr, sync::Arc, time::Duration};

use crate::{api::ChatApi, session::run_client_session, transport::TcpTransport};

/// Run the interactive client against `server`
///
/// # Arguments
///
/// * `server` - Server address, e.g. "127.0.0.1:6174"
/// * `bind` - Local IP to send from; the server tells users apart by it
/// * `poll_interval` - Delay between fetches while in a room
pub async fn run_client(
    server: String,
    bind: Option<IpAddr>,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    match bind {
        Some(ip) => tracing::info!("Using server {} from {}", server, ip),
        None => tracing::info!("Using server {}", server),
    }

    let api = ChatApi::new(Arc::new(TcpTransport::new(server, bind)));
    run_client_session(api, poll_interval).await?;

    tracing::info!("Client session ended normally");
    Ok(())
}
