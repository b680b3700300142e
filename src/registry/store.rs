//! Channel registry implementation
//!
//! The registry is built once at startup with a fixed number of channels.
//! Channels are never added or removed afterwards, so lookups need no lock.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::config::RegistryConfig;
use super::entry::{ChannelEntry, ChannelStats};
use super::error::RegistryError;
use super::frame::ChannelId;
use crate::source::{FrameSource, Producer};

/// Fixed set of channels shared by producers and sessions
#[derive(Debug)]
pub struct ChannelRegistry {
    /// Channel entries indexed by id
    channels: Vec<Arc<ChannelEntry>>,

    /// Configuration
    config: RegistryConfig,
}

impl ChannelRegistry {
    /// Create a registry with `channel_count` empty channels
    pub fn new(channel_count: usize, config: RegistryConfig) -> Self {
        let channels = (0..channel_count)
            .map(|id| Arc::new(ChannelEntry::new(id, &config)))
            .collect();

        Self { channels, config }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Look up a channel
    pub fn channel(&self, id: ChannelId) -> Result<Arc<ChannelEntry>, RegistryError> {
        self.channels
            .get(id)
            .cloned()
            .ok_or(RegistryError::ChannelNotFound(id))
    }

    /// Attach a producer to a channel and spawn it
    ///
    /// Each channel accepts one producer at a time. The returned handle can
    /// be used to abort the task; otherwise it runs forever. Once the task
    /// is gone the channel accepts a new producer.
    pub fn spawn_producer<S: FrameSource>(
        &self,
        id: ChannelId,
        source: S,
    ) -> Result<JoinHandle<()>, RegistryError> {
        let channel = self.channel(id)?;
        let claim = channel
            .claim_producer()
            .ok_or(RegistryError::ProducerAlreadyAttached(id))?;

        let producer = Producer::new(
            source,
            channel,
            self.config.max_frame_lines,
            self.config.max_line_len,
            self.config.source_retry_interval,
        );

        Ok(tokio::spawn(async move {
            let _claim = claim;
            producer.run().await
        }))
    }

    /// Get channel statistics
    pub fn channel_stats(&self, id: ChannelId) -> Option<ChannelStats> {
        self.channels.get(id).map(|entry| entry.stats())
    }

    /// Statistics for every channel, in id order
    pub fn all_stats(&self) -> Vec<ChannelStats> {
        self.channels.iter().map(|entry| entry.stats()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_channel_lookup() {
        let registry = ChannelRegistry::new(3, RegistryConfig::default());

        assert_eq!(registry.channel_count(), 3);
        assert_eq!(registry.channel(2).unwrap().id, 2);
        assert_eq!(
            registry.channel(3).unwrap_err(),
            RegistryError::ChannelNotFound(3)
        );
    }

    #[test]
    fn test_channels_have_own_buffers() {
        let config = RegistryConfig::default().buffer_capacity(7);
        let registry = ChannelRegistry::new(2, config);

        let a = registry.channel(0).unwrap();
        let b = registry.channel(1).unwrap();
        assert!(!std::ptr::eq(a.buffer(), b.buffer()));
        assert_eq!(a.buffer().capacity(), 7);
    }

    #[tokio::test]
    async fn test_one_producer_per_channel() {
        let registry = ChannelRegistry::new(1, RegistryConfig::default());

        let handle = registry
            .spawn_producer(0, MemorySource::from_frames("a", ["A"]))
            .unwrap();
        let second = registry.spawn_producer(0, MemorySource::from_frames("b", ["B"]));
        assert_eq!(
            second.unwrap_err(),
            RegistryError::ProducerAlreadyAttached(0)
        );

        let missing = registry.spawn_producer(5, MemorySource::from_frames("c", ["C"]));
        assert_eq!(missing.unwrap_err(), RegistryError::ChannelNotFound(5));

        handle.abort();
    }

    #[tokio::test]
    async fn test_aborted_producer_releases_channel() {
        let registry = ChannelRegistry::new(1, RegistryConfig::default());

        let handle = registry
            .spawn_producer(0, MemorySource::from_frames("a", ["A"]))
            .unwrap();
        assert!(registry.channel_stats(0).unwrap().has_producer);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!registry.channel_stats(0).unwrap().has_producer);

        let again = registry
            .spawn_producer(0, MemorySource::from_frames("b", ["B"]))
            .unwrap();
        assert!(registry.channel_stats(0).unwrap().has_producer);
        again.abort();
    }

    #[tokio::test]
    async fn test_all_stats() {
        let registry = ChannelRegistry::new(2, RegistryConfig::default());
        registry
            .channel(1)
            .unwrap()
            .buffer()
            .push(&crate::registry::Frame::from_lines(["x\n"]))
            .await;

        let stats = registry.all_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].buffered_frames, 0);
        assert_eq!(stats[1].buffered_frames, 1);
        assert_eq!(registry.channel_stats(1), Some(stats[1].clone()));
        assert_eq!(registry.channel_stats(2), None);
    }
}
