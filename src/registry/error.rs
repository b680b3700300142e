//! Registry error types
//!
//! Error types for channel registry operations.

use super::frame::ChannelId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No channel with this id
    ChannelNotFound(ChannelId),
    /// Channel is already fed by a producer
    ProducerAlreadyAttached(ChannelId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::ChannelNotFound(id) => write!(f, "Channel not found: {}", id),
            RegistryError::ProducerAlreadyAttached(id) => {
                write!(f, "Channel already has a producer: {}", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
