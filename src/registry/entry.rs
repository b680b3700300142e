//! Channel entry and statistics types
//!
//! This module defines the per-channel state stored in the registry.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use super::buffer::ChannelBuffer;
use super::config::RegistryConfig;
use super::frame::ChannelId;

/// Entry for a single channel in the registry
#[derive(Debug)]
pub struct ChannelEntry {
    /// Channel index
    pub id: ChannelId,

    /// Frames waiting for delivery
    buffer: ChannelBuffer,

    /// Whether a producer has been attached
    has_producer: AtomicBool,

    /// Frames pushed by the producer
    frames_produced: AtomicU64,

    /// Frames written to clients
    frames_delivered: AtomicU64,

    /// Completed reads of the source
    source_passes: AtomicU64,

    /// Failed attempts to open the source
    source_open_failures: AtomicU64,

    /// Sessions currently streaming this channel
    active_sessions: AtomicU32,
}

impl ChannelEntry {
    /// Create a new channel entry
    pub(super) fn new(id: ChannelId, config: &RegistryConfig) -> Self {
        Self {
            id,
            buffer: ChannelBuffer::new(
                config.buffer_capacity,
                config.max_frame_lines,
                config.max_line_len,
            ),
            has_producer: AtomicBool::new(false),
            frames_produced: AtomicU64::new(0),
            frames_delivered: AtomicU64::new(0),
            source_passes: AtomicU64::new(0),
            source_open_failures: AtomicU64::new(0),
            active_sessions: AtomicU32::new(0),
        }
    }

    /// The channel's frame buffer
    pub fn buffer(&self) -> &ChannelBuffer {
        &self.buffer
    }

    /// Whether a producer feeds this channel
    pub fn has_producer(&self) -> bool {
        self.has_producer.load(Ordering::Acquire)
    }

    /// Claim the producer slot; `None` if one is already attached
    ///
    /// The slot is released when the returned claim is dropped.
    pub(super) fn claim_producer(self: &Arc<Self>) -> Option<ProducerClaim> {
        self.has_producer
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProducerClaim {
                entry: Arc::clone(self),
            })
    }

    /// Number of sessions streaming this channel
    pub fn active_sessions(&self) -> u32 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    pub(crate) fn record_produced(&self) {
        self.frames_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pass(&self) {
        self.source_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_open_failure(&self) {
        self.source_open_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a session as streaming until the guard is dropped
    pub(crate) fn session_guard(&self) -> SessionGuard<'_> {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        SessionGuard { entry: self }
    }

    /// Snapshot of the channel counters
    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            id: self.id,
            frames_produced: self.frames_produced.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            source_passes: self.source_passes.load(Ordering::Relaxed),
            source_open_failures: self.source_open_failures.load(Ordering::Relaxed),
            active_sessions: self.active_sessions(),
            buffered_frames: self.buffer.len(),
            has_producer: self.has_producer(),
        }
    }
}

/// Keeps a session counted on its channel
pub(crate) struct SessionGuard<'a> {
    entry: &'a ChannelEntry,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.entry.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Holds a channel's producer slot
#[derive(Debug)]
pub(crate) struct ProducerClaim {
    entry: Arc<ChannelEntry>,
}

impl Drop for ProducerClaim {
    fn drop(&mut self) {
        self.entry.has_producer.store(false, Ordering::Release);
    }
}

/// Statistics for a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    /// Channel index
    pub id: ChannelId,
    /// Frames pushed into the buffer
    pub frames_produced: u64,
    /// Frames written to clients
    pub frames_delivered: u64,
    /// Completed reads of the source
    pub source_passes: u64,
    /// Failed attempts to open the source
    pub source_open_failures: u64,
    /// Sessions currently streaming
    pub active_sessions: u32,
    /// Frames waiting in the buffer
    pub buffered_frames: usize,
    /// Whether a producer is attached
    pub has_producer: bool,
}
