//! Standalone server bootstrap (§4.7, §6). In co-embedded mode the host
//! process instead takes [`crate::router::build_router`]'s `Router` and
//! mounts it on its own `axum::serve` call; this module is only the
//! "start my own server in the background" path.

use crate::router::build_router;
use crate::state::AppState;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default port, overridable by `INSPECTOR_PORT` (§6).
pub const DEFAULT_PORT: u16 = 7800;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

/// Bind and serve until a shutdown signal arrives, then drain the SSE
/// subscribers with a final `:` comment (§5) before returning.
///
/// Binding failure (e.g. the port is already taken) is the one condition
/// under which a standalone process should exit non-zero (§6); callers
/// convert the returned IO error into that exit code at `main`.
pub async fn serve(state: AppState, config: ServerConfig) -> std::io::Result<()> {
    let addr = SocketAddr::new(config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "mcp-agent-inspector gateway listening");

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}
