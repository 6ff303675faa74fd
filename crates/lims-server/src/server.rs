//! Server lifecycle management.
//!
//! [`LimsServer::bind`] binds both listeners up front so a port conflict
//! surfaces as a fatal [`ServerError::Bind`] before anything is served.
//! [`LimsServer::run`] then serves both ports until `Ctrl-C`.

use std::net::SocketAddr;
use std::sync::Arc;

use lims_core::config::ServerConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::files::StaticAssets;
use crate::router::{build_http_router, build_ws_router};
use crate::state::AppState;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Both listeners, bound and ready to serve.
pub struct LimsServer {
    ws_listener: TcpListener,
    http_listener: TcpListener,
    state: Arc<AppState>,
    assets: Arc<StaticAssets>,
}

impl LimsServer {
    /// Bind the message port and the static asset port.
    ///
    /// Port `0` picks an ephemeral port; see [`LimsServer::ws_addr`].
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the host does not resolve or
    /// either port cannot be bound.
    pub async fn bind(config: &ServerConfig, state: Arc<AppState>) -> Result<Self, ServerError> {
        let ws_listener = bind_listener(&config.host, config.ws_port).await?;
        let http_listener = bind_listener(&config.host, config.http_port).await?;

        Ok(Self {
            ws_listener,
            http_listener,
            state,
            assets: Arc::new(StaticAssets::new(
                config.web_root.clone(),
                config.index_document.clone(),
            )),
        })
    }

    /// Address of the `WebSocket` listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the socket address is unavailable.
    pub fn ws_addr(&self) -> Result<SocketAddr, ServerError> {
        local_addr(&self.ws_listener)
    }

    /// Address of the static asset listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the socket address is unavailable.
    pub fn http_addr(&self) -> Result<SocketAddr, ServerError> {
        local_addr(&self.http_listener)
    }

    /// Serve both ports until `Ctrl-C` or until either server fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] if either server hits a fatal I/O
    /// error.
    pub async fn run(self) -> Result<(), ServerError> {
        let ws_router = build_ws_router(self.state);
        let http_router = build_http_router(Arc::clone(&self.assets));

        info!(
            ws_addr = ?self.ws_listener.local_addr().ok(),
            http_addr = ?self.http_listener.local_addr().ok(),
            web_root = %self.assets.root().display(),
            "LIMS server listening"
        );

        let ws_server = axum::serve(
            self.ws_listener,
            ws_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal());
        let http_server =
            axum::serve(self.http_listener, http_router).with_graceful_shutdown(shutdown_signal());

        tokio::try_join!(
            async { ws_server.await.map_err(|e| ServerError::Serve(format!("ws: {e}"))) },
            async {
                http_server
                    .await
                    .map_err(|e| ServerError::Serve(format!("http: {e}")))
            },
        )?;

        info!("LIMS server stopped");
        Ok(())
    }
}

async fn bind_listener(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {host}:{port}: {e}")))
}

fn local_addr(listener: &TcpListener) -> Result<SocketAddr, ServerError> {
    listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; serving until the process exits");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
