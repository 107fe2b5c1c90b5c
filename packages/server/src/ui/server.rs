//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use super::{
    dispatcher::Dispatcher,
    handler::{get_room_detail, get_rooms, handle_connection, health_check},
    signal::shutdown_signal,
    state::AppState,
};

/// Chat server
///
/// Serves the chat protocol over TCP and, optionally, a read-only admin API
/// over HTTP.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::in_memory(Arc::new(SystemClock)));
/// Server::new(state).run("0.0.0.0".to_string(), 6174, Some(8080)).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the chat server until Ctrl+C
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "0.0.0.0")
    /// * `port` - The chat protocol port
    /// * `admin_port` - The admin HTTP API port; the API is disabled when `None`
    ///
    /// # Errors
    ///
    /// Returns an error if either listener fails to bind.
    pub async fn run(
        self,
        host: String,
        port: u16,
        admin_port: Option<u16>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Chat server listening on {}", listener.local_addr()?);

        let admin = match admin_port {
            Some(admin_port) => {
                let admin_addr = format!("{}:{}", host, admin_port);
                let admin_listener = TcpListener::bind(&admin_addr).await?;
                tracing::info!(
                    "Admin API listening on http://{}",
                    admin_listener.local_addr()?
                );

                let app = admin_router(self.state.clone());
                Some(tokio::spawn(async move {
                    if let Err(e) = axum::serve(admin_listener, app)
                        .with_graceful_shutdown(shutdown_signal())
                        .await
                    {
                        tracing::error!("Admin API error: {}", e);
                    }
                }))
            }
            None => None,
        };

        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener, shutdown_signal()).await;

        if let Some(admin) = admin
            && let Err(e) = admin.await
        {
            tracing::error!("Admin API task failed: {}", e);
        }
        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    ///
    /// Each connection is served on its own task; requests already in
    /// flight are not cancelled by shutdown.
    pub async fn serve(self, listener: TcpListener, shutdown: impl Future<Output = ()>) {
        let dispatcher = Arc::new(Dispatcher::new(self.state));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let span = tracing::debug_span!("connection", peer = %peer);
                        tokio::spawn(
                            handle_connection(stream, peer, dispatcher.clone()).instrument(span),
                        );
                    }
                    Err(e) => tracing::warn!("Failed to accept connection: {}", e),
                },
            }
        }
    }
}

/// Read-only admin API
pub fn admin_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{name}", get(get_room_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
