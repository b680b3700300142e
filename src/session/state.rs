//! Session state machine
//!
//! Tracks one client connection from accept to close:
//!
//! ```text
//!   AwaitingChannelSelection ──(valid id)──► Streaming ──► Closed
//!              │                                            ▲
//!              └──────(missing / invalid id)────────────────┘
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use crate::registry::ChannelId;
use crate::stats::SessionStats;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connected, waiting for the channel selection
    AwaitingChannelSelection,
    /// Sending frames from the selected channel
    Streaming,
    /// Connection finished
    Closed,
}

/// Complete session state
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID
    pub id: u64,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Selected channel (once streaming)
    pub channel: Option<ChannelId>,

    /// Connection start time
    pub connected_at: Instant,

    /// Time when streaming started
    pub streaming_since: Option<Instant>,

    /// Frames written to the client
    pub frames_sent: u64,

    /// Bytes written to the client
    pub bytes_sent: u64,
}

impl SessionState {
    /// Create a new session state
    pub fn new(id: u64, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::AwaitingChannelSelection,
            channel: None,
            connected_at: Instant::now(),
            streaming_since: None,
            frames_sent: 0,
            bytes_sent: 0,
        }
    }

    /// Start streaming the given channel
    pub fn select_channel(&mut self, channel: ChannelId) {
        if self.phase == SessionPhase::AwaitingChannelSelection {
            self.channel = Some(channel);
            self.phase = SessionPhase::Streaming;
            self.streaming_since = Some(Instant::now());
        }
    }

    /// Count one frame written to the client
    pub fn record_frame(&mut self, bytes: usize) {
        self.frames_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    /// Check if session is streaming
    pub fn is_streaming(&self) -> bool {
        self.phase == SessionPhase::Streaming
    }

    /// Close the session; closing is terminal
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }

    /// Snapshot of the session counters
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames_sent: self.frames_sent,
            bytes_sent: self.bytes_sent,
            duration: self.duration(),
        }
    }
}
