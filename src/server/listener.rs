//! HTTP server listener
//!
//! Binds the socket and serves the router until shutdown. On shutdown the hub
//! is closed first: every subscriber queue is released, each delivery loop
//! ends its stream and the server can drain.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::hub::BroadcastHub;
use crate::server::config::ServerConfig;
use crate::server::routes::{self, AppState};

/// Live view HTTP server
pub struct HttpServer {
    config: ServerConfig,
    hub: Arc<BroadcastHub>,
}

impl HttpServer {
    /// Create a new server publishing from the given hub
    pub fn new(config: ServerConfig, hub: Arc<BroadcastHub>) -> Self {
        Self { config, hub }
    }

    /// Get a reference to the broadcast hub
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Build the router served by this server
    pub fn router(&self) -> Router {
        routes::router(AppState::new(
            Arc::clone(&self.hub),
            self.config.sink_buffer,
        ))
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "HTTP server listening");

        let hub = Arc::clone(&self.hub);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
                hub.shutdown();
            })
            .await?;

        let stats = self.hub.stats();
        tracing::info!(
            published = stats.total_published,
            subscribed = stats.total_subscribed,
            dropped = stats.total_dropped,
            "HTTP server stopped"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;

    #[test]
    fn test_bind_addr() {
        let addr: SocketAddr = "127.0.0.1:8123".parse().unwrap();
        let server = HttpServer::new(ServerConfig::with_addr(addr), Arc::new(BroadcastHub::new()));

        assert_eq!(server.bind_addr(), addr);
        assert_eq!(server.hub().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_open_streams() {
        let hub = Arc::new(BroadcastHub::new());
        let server = HttpServer::new(ServerConfig::default(), Arc::clone(&hub));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /stream HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let mut buf = [0u8; 1024];
        let n = client.read(&mut buf).await.unwrap();
        assert!(n > 0);

        stop_tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not drain")
            .unwrap();
        assert!(result.is_ok());
        assert!(hub.is_closed());
        assert_eq!(hub.subscriber_count(), 0);
    }
}
