use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::proxy::connection::ConnectionCounter;
use crate::proxy::error::ProxyError;
use crate::proxy::forward::Forwarder;
use crate::proxy::router::build_router;
use crate::proxy::shutdown::ShutdownManager;

pub struct ProxyServer {
    pub addr: SocketAddr,
    /// The bound listener, kept alive to prevent port race conditions.
    /// Populated by try_bind(), consumed by run().
    listener: Option<TcpListener>,
    bind_addr: String,
    forwarder: Arc<Forwarder>,
    shutdown: Arc<ShutdownManager>,
}

impl ProxyServer {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        Ok(Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)), // Will be determined at bind time
            listener: None,
            bind_addr: config.bind_addr.clone(),
            forwarder: Arc::new(Forwarder::new(config)?),
            shutdown: Arc::new(ShutdownManager::new()),
        })
    }

    /// Try to bind to the configured address, falling back to incremental ports if busy.
    ///
    /// The listener is kept alive so no other process can claim the port
    /// between try_bind() and run().
    pub async fn try_bind(&mut self) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
        let bind_addr: SocketAddr = self
            .bind_addr
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind_addr, e))?;

        let start_port = bind_addr.port();
        let host = bind_addr.ip();

        // Port 0 asks the OS for any free port; no fallback range needed.
        let last_port = if start_port == 0 {
            0
        } else {
            start_port.saturating_add(100)
        };

        for port in start_port..=last_port {
            let try_addr = SocketAddr::new(host, port);
            match TcpListener::bind(try_addr).await {
                Ok(listener) => {
                    let actual_addr = listener.local_addr()?;
                    self.addr = actual_addr;
                    self.listener = Some(listener);
                    tracing::info!("Proxy bound to {}", actual_addr);
                    return Ok(actual_addr);
                }
                Err(e) => {
                    tracing::debug!("Port {} busy: {}", port, e);
                    continue;
                }
            }
        }

        Err(format!("Could not find available port in range {}-{}", start_port, last_port).into())
    }

    pub fn handle(&self) -> ProxyHandle {
        ProxyHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Run the proxy server.
    ///
    /// Consumes self to take ownership of the pre-bound listener.
    /// Call try_bind() before run() to bind to an available port.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = self.listener.ok_or("try_bind() must be called before run()")?;

        tracing::info!(
            "Starting proxy server on {} (prefix {})",
            self.addr,
            self.forwarder.prefix()
        );

        let app = build_router(self.forwarder.clone());
        let make_service = app.into_make_service();
        let make_service = ConnectionCounter::new(make_service, self.shutdown.clone());

        let shutdown = self.shutdown.clone();
        axum::serve(listener, make_service)
            .with_graceful_shutdown(async move {
                if let Err(e) = shutdown.wait_for_shutdown().await {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                }
            })
            .into_future()
            .await?;

        self.shutdown.wait_for_connections(Duration::from_secs(10)).await;
        tracing::info!("Shutting down gracefully");

        Ok(())
    }
}

#[derive(Clone)]
pub struct ProxyHandle {
    shutdown: Arc<ShutdownManager>,
}

impl ProxyHandle {
    pub fn shutdown(&self) {
        self.shutdown.signal_shutdown();
    }
}
