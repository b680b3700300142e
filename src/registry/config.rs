//! Channel registry configuration

use std::time::Duration;

use crate::protocol::constants::*;

/// Per-channel buffering and source settings
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Frame slots in each channel buffer
    pub buffer_capacity: usize,

    /// Lines kept per frame; extra lines are dropped
    pub max_frame_lines: usize,

    /// Bytes kept per line; longer lines are truncated
    pub max_line_len: usize,

    /// Wait before re-opening a source that failed to open
    pub source_retry_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_frame_lines: DEFAULT_MAX_FRAME_LINES,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            source_retry_interval: DEFAULT_SOURCE_RETRY_INTERVAL,
        }
    }
}

impl RegistryConfig {
    /// Set buffer capacity
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set maximum lines per frame
    pub fn max_frame_lines(mut self, lines: usize) -> Self {
        self.max_frame_lines = lines;
        self
    }

    /// Set maximum line length
    pub fn max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    /// Set source retry interval
    pub fn source_retry_interval(mut self, interval: Duration) -> Self {
        self.source_retry_interval = interval;
        self
    }

    /// Check that every limit is usable
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_capacity == 0 {
            return Err("buffer capacity must be at least 1".into());
        }
        if self.max_frame_lines == 0 {
            return Err("max frame lines must be at least 1".into());
        }
        if self.max_line_len == 0 {
            return Err("max line length must be at least 1".into());
        }
        Ok(())
    }
}
