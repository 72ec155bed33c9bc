use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::gateway::GatewayServices;
use crate::shared::config::CONFIG;

use super::handler::handle_request;

pub async fn run_http_server(services: Arc<GatewayServices>) -> anyhow::Result<()> {
    let addr: SocketAddr = CONFIG.server.http_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("HTTP server running at http://{addr}/query/v2");

    // Keep-alive off by default: query responses are large and client pools
    // holding idle connections exhaust file descriptors under load.
    let enable_keep_alive: bool = std::env::var("TSGATE_HTTP_KEEP_ALIVE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(false);

    loop {
        let (stream, _peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept HTTP connection: {}", e);
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let services = Arc::clone(&services);

        tokio::spawn(async move {
            let mut builder = hyper::server::conn::http1::Builder::new();
            builder.keep_alive(enable_keep_alive);

            if let Err(err) = builder
                .serve_connection(
                    io,
                    service_fn(move |req| handle_request(req, Arc::clone(&services))),
                )
                .await
            {
                // Only log non-connection-closed errors to reduce noise
                let text = err.to_string();
                if !text.contains("connection closed")
                    && !text.contains("broken pipe")
                    && !text.contains("Connection reset")
                {
                    warn!("Error serving connection: {:?}", err);
                }
            }
        });
    }
}
