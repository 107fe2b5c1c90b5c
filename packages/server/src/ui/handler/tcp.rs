//! Chat protocol connection handler.

use std::{net::SocketAddr, sync::Arc};

use hiroba_shared::codec::{CodecError, read_envelope, write_envelope};
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::TcpStream,
};

use crate::{
    domain::ClientIdentity,
    ui::dispatcher::{DispatchError, Dispatcher},
};

/// Serve one connection: read one request, write one response, close.
///
/// The client's identity is its IP address only; every request arrives on a
/// fresh connection with a fresh source port.
pub async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<Dispatcher>,
) {
    let identity = ClientIdentity::from(peer.ip());
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let request = match read_envelope(&mut reader).await {
        Ok(request) => request,
        Err(CodecError::Closed) => {
            tracing::debug!("Connection closed before a request arrived");
            return;
        }
        Err(e) => {
            tracing::warn!("Dropping connection: {}", e);
            return;
        }
    };
    let command = request.command;
    tracing::debug!("Received {} from {}", command, identity);

    let response = match dispatcher.dispatch(identity, request).await {
        Ok(response) => response,
        Err(DispatchError::Protocol(reason)) => {
            tracing::warn!("Dropping {} request: {}", command, reason);
            return;
        }
        Err(DispatchError::Inconsistent(reason)) => {
            tracing::error!("Dropping {} request: {}", command, reason);
            return;
        }
    };

    if let Err(e) = write_envelope(&mut writer, &response).await {
        tracing::warn!("Failed to write {} response: {}", command, e);
        return;
    }
    if let Err(e) = writer.shutdown().await {
        tracing::debug!("Failed to shut down connection: {}", e);
    }
}
