//! Per-client streaming session
//!
//! Reads the client's channel selection, then pops frames from that
//! channel's buffer and writes them out at a fixed pace until the client
//! goes away.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::protocol::{read_selection, validate_selection};
use crate::registry::{ChannelEntry, ChannelRegistry};
use crate::server::config::ServerConfig;
use crate::session::SessionState;
use crate::stats::ServerCounters;

/// One client connection
pub struct Connection<S> {
    session: SessionState,
    stream: S,
    config: ServerConfig,
    registry: Arc<ChannelRegistry>,
    counters: Arc<ServerCounters>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a connection handler
    pub fn new(
        session_id: u64,
        stream: S,
        peer_addr: SocketAddr,
        config: ServerConfig,
        registry: Arc<ChannelRegistry>,
        counters: Arc<ServerCounters>,
    ) -> Self {
        Self {
            session: SessionState::new(session_id, peer_addr),
            stream,
            config,
            registry,
            counters,
        }
    }

    /// Session state
    pub fn state(&self) -> &SessionState {
        &self.session
    }

    /// Serve the client until it disconnects or breaks the protocol
    ///
    /// A client that closes its side while streaming ends the session with
    /// `Ok(())`. The session is always `Closed` when this returns.
    pub async fn run(&mut self) -> Result<()> {
        let result = self.serve().await;
        self.session.close();
        result
    }

    async fn serve(&mut self) -> Result<()> {
        let requested = match read_selection(&mut self.stream, self.config.selection_timeout).await
        {
            Ok(requested) => requested,
            Err(e) => {
                if matches!(e, Error::Protocol(_)) {
                    self.counters.invalid_selection();
                }
                return Err(e);
            }
        };

        let id = match validate_selection(requested, self.registry.channel_count()) {
            Ok(id) => id,
            Err(e) => {
                self.counters.invalid_selection();
                tracing::debug!(
                    session_id = self.session.id,
                    requested = requested,
                    "Invalid channel selection"
                );
                return Err(e.into());
            }
        };

        let channel = self.registry.channel(id)?;
        let _streaming = channel.session_guard();
        self.session.select_channel(id);

        tracing::debug!(
            session_id = self.session.id,
            channel = id,
            viewers = channel.active_sessions(),
            "Streaming started"
        );

        self.stream_frames(&channel).await
    }

    async fn stream_frames(&mut self, channel: &ChannelEntry) -> Result<()> {
        let mut scratch = [0u8; 256];

        loop {
            // Watch the socket while waiting so a client that leaves during
            // a stalled channel is noticed
            let frame = tokio::select! {
                frame = channel.buffer().pop() => frame,
                read = self.stream.read(&mut scratch) => {
                    match read? {
                        0 => return Ok(()),
                        _ => continue,
                    }
                }
            };

            let payload = frame.encode();
            self.stream.write_all(&payload).await?;
            self.stream.flush().await?;

            self.session.record_frame(payload.len());
            channel.record_delivered();

            tokio::time::sleep(self.config.frame_interval).await;
        }
    }
}
