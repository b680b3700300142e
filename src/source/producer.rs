//! Per-channel producer task
//!
//! Keeps one channel's buffer supplied for the lifetime of the server:
//!
//! ```text
//!   ┌──► open source ──(error)──► sleep(retry) ──┐
//!   │        │                                    │
//!   │        ▼                                    │
//!   │   read frame ──► buffer.push() (waits when full)
//!   │        │
//!   │   end of source
//!   └────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use super::reader::FrameReader;
use super::FrameSource;
use crate::registry::ChannelEntry;

/// Feeds frames from a source into a channel buffer forever
pub struct Producer<S: FrameSource> {
    source: S,
    channel: Arc<ChannelEntry>,
    max_frame_lines: usize,
    max_line_len: usize,
    retry_interval: Duration,
}

impl<S: FrameSource> Producer<S> {
    /// Create a producer for `channel`
    pub fn new(
        source: S,
        channel: Arc<ChannelEntry>,
        max_frame_lines: usize,
        max_line_len: usize,
        retry_interval: Duration,
    ) -> Self {
        Self {
            source,
            channel,
            max_frame_lines,
            max_line_len,
            retry_interval,
        }
    }

    /// Run until the task is aborted
    ///
    /// Open failures are retried every `retry_interval`. A pass that yields
    /// no frame is also followed by one retry interval so an empty source
    /// does not spin.
    pub async fn run(self) {
        let source = self.source.describe();
        tracing::info!(channel = self.channel.id, source = %source, "Producer started");

        loop {
            let reader = match self.source.open().await {
                Ok(reader) => reader,
                Err(e) => {
                    self.channel.record_open_failure();
                    tracing::warn!(
                        channel = self.channel.id,
                        source = %source,
                        error = %e,
                        retry_ms = self.retry_interval.as_millis() as u64,
                        "Failed to open frame source"
                    );
                    tokio::time::sleep(self.retry_interval).await;
                    continue;
                }
            };

            let reader = FrameReader::new(reader, self.max_frame_lines, self.max_line_len);
            let produced = self.run_pass(reader).await;
            self.channel.record_pass();

            tracing::debug!(
                channel = self.channel.id,
                source = %source,
                frames = produced,
                "Source exhausted, restarting"
            );

            if produced == 0 {
                tokio::time::sleep(self.retry_interval).await;
            }
        }
    }

    /// Push every frame of one pass; returns the number pushed
    async fn run_pass(&self, mut reader: FrameReader<S::Reader>) -> u64 {
        let mut produced = 0;

        loop {
            match reader.next_frame().await {
                Ok(Some(frame)) => {
                    self.channel.buffer().push(&frame).await;
                    self.channel.record_produced();
                    produced += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        channel = self.channel.id,
                        error = %e,
                        "Frame source read failed, restarting"
                    );
                    break;
                }
            }
        }

        produced
    }
}
