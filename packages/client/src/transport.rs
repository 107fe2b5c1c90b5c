//! Request/response transport.

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use hiroba_shared::{
    codec::{read_envelope, write_envelope},
    protocol::Envelope,
};
use tokio::{
    io::BufReader,
    net::{TcpSocket, TcpStream, lookup_host},
};

use crate::error::ClientError;

/// One request in, one response out
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Envelope) -> Result<Envelope, ClientError>;
}

/// Opens a fresh TCP connection for every request.
///
/// The server identifies clients by source IP, so `bind` lets several
/// clients on one host appear as different users (e.g. 127.0.0.1 and
/// 127.0.0.2).
#[derive(Debug, Clone)]
pub struct TcpTransport {
    server: String,
    bind: Option<IpAddr>,
}

impl TcpTransport {
    pub fn new(server: impl Into<String>, bind: Option<IpAddr>) -> Self {
        Self {
            server: server.into(),
            bind,
        }
    }

    async fn connect(&self) -> Result<TcpStream, ClientError> {
        let addr = lookup_host(&self.server).await?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no address found for {}", self.server),
            )
        })?;

        let Some(local) = self.bind else {
            return Ok(TcpStream::connect(addr).await?);
        };
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.bind(SocketAddr::new(local, 0))?;
        Ok(socket.connect(addr).await?)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, request: Envelope) -> Result<Envelope, ClientError> {
        let mut stream = self.connect().await?;
        let (reader, mut writer) = stream.split();

        write_envelope(&mut writer, &request).await?;
        let response = read_envelope(&mut BufReader::new(reader)).await?;

        if response.command != request.command {
            return Err(ClientError::UnexpectedResponse {
                expected: request.command,
                actual: response.command,
            });
        }
        Ok(response)
    }
}
