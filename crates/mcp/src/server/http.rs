//! Streamable-HTTP hosting for the MCP tool server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum::Router;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::server::core::{DomainctlMcpCore, McpToolServices};

/// Start the MCP server and return a handle for shutdown.
pub async fn start_server(bind_address: SocketAddr, services: Arc<McpToolServices>) -> Result<RunningMcpServer> {
    let cancellation_token = CancellationToken::new();
    let session_manager = Arc::new(LocalSessionManager::default());

    let service: StreamableHttpService<DomainctlMcpCore, LocalSessionManager> = StreamableHttpService::new(
        move || Ok(DomainctlMcpCore::new(Arc::clone(&services))),
        Arc::clone(&session_manager),
        StreamableHttpServerConfig {
            stateful_mode: true,
            sse_keep_alive: None,
            cancellation_token: cancellation_token.child_token(),
            ..Default::default()
        },
    );

    let router = Router::new().nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    let bound_address = listener.local_addr()?;
    info!(%bound_address, "MCP server listening");

    let server_handle = tokio::spawn({
        let shutdown = cancellation_token.child_token();
        async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown.cancelled().await;
                })
                .await;
        }
    });

    Ok(RunningMcpServer {
        bound_address,
        cancellation_token,
        server_handle,
    })
}

/// Runtime handle for a running MCP server.
#[derive(Debug)]
pub struct RunningMcpServer {
    bound_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningMcpServer {
    /// The bound socket address of the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bound_address
    }

    /// Stop the server and wait for the serve task to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("MCP server task failed: {error}"))?;
        Ok(())
    }
}

/// Resolve a safe local bind address for the MCP server.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or("127.0.0.1:0");
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid MCP bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        return Err(anyhow!("the MCP server must bind to a loopback address"));
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}
