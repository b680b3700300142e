//! Frame server listener
//!
//! Handles TCP accept loop and spawns connection handlers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::registry::{ChannelRegistry, RegistryError};
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::source::FileSource;
use crate::stats::{ServerCounters, ServerStats};

/// Multi-channel frame server
pub struct FrameServer {
    config: ServerConfig,
    registry: Arc<ChannelRegistry>,
    counters: Arc<ServerCounters>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl FrameServer {
    /// Create a server with one file-backed channel per configured path
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let registry = ChannelRegistry::new(config.channels.len(), config.registry.clone());
        Ok(Self::with_registry(config, Arc::new(registry)))
    }

    /// Create a server over an existing registry
    ///
    /// Channels of `registry` without a producer are fed from
    /// `config.channels` when the server starts; the caller may attach its
    /// own sources beforehand with [`ChannelRegistry::spawn_producer`].
    pub fn with_registry(config: ServerConfig, registry: Arc<ChannelRegistry>) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            registry,
            counters: Arc::new(ServerCounters::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the channel registry
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Server-wide statistics
    pub fn stats(&self) -> ServerStats {
        self.counters.snapshot()
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_until(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let _producers = self.start_producers();
        self.log_listening(&listener);
        self.accept_loop(&listener).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Producers started here are stopped on shutdown and their channels
    /// released, so the server can be served again. Sessions already
    /// running are left to finish on their own.
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let producers = self.start_producers();
        self.log_listening(&listener);

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        };

        for producer in producers {
            producer.abort();
            let _ = producer.await;
        }

        result
    }

    /// Spawn a file producer for every configured channel not yet fed
    fn start_producers(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.config.channels.len());

        for (id, path) in self.config.channels.iter().enumerate() {
            match self.registry.spawn_producer(id, FileSource::new(path)) {
                Ok(handle) => handles.push(handle),
                Err(RegistryError::ProducerAlreadyAttached(_)) => {
                    tracing::debug!(channel = id, "Channel already has a producer");
                }
                Err(e) => {
                    tracing::warn!(channel = id, error = %e, "Failed to start producer");
                }
            }
        }

        handles
    }

    fn log_listening(&self, listener: &TcpListener) {
        let addr = listener.local_addr().unwrap_or(self.config.bind_addr);
        tracing::info!(
            addr = %addr,
            channels = self.registry.channel_count(),
            "Frame server listening"
        );
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.counters.connection_rejected();
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let config = self.config.clone();
        let registry = Arc::clone(&self.registry);
        let counters = Arc::clone(&self.counters);

        counters.connection_opened();

        tokio::spawn(async move {
            let _permit = permit;
            let mut connection = Connection::new(
                session_id,
                socket,
                peer_addr,
                config,
                registry,
                Arc::clone(&counters),
            );

            match connection.run().await {
                Ok(()) => {}
                Err(e) if e.is_disconnect() => {
                    tracing::debug!(session_id = session_id, error = %e, "Client disconnected");
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = session_id,
                        peer = %peer_addr,
                        error = %e,
                        "Connection error"
                    );
                }
            }

            let state = connection.state();
            let stats = state.stats();
            tracing::debug!(
                session_id = session_id,
                channel = ?state.channel,
                frames = stats.frames_sent,
                bytes = stats.bytes_sent,
                duration_ms = stats.duration.as_millis() as u64,
                "Connection closed"
            );

            counters.connection_closed();
        });
    }
}
