//! Server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use pagelayer_config::ServerConfig;

use crate::error::ApiError;
use crate::http::routes::create_router;
use crate::state::AppState;

pub struct ProxyServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ProxyServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until Ctrl-C.
    pub async fn run(&self) -> Result<(), ApiError> {
        let addr: SocketAddr = self
            .addr()
            .parse()
            .map_err(|e| ApiError::Startup(format!("bad listen address {}: {}", self.addr(), e)))?;
        let listener = TcpListener::bind(addr).await?;

        info!("Listening on {} (public root {})", addr, self.config.public_root);
        axum::serve(listener, create_router(self.state.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
