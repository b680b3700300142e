//! Error types
//!
//! Errors are grouped by where they surface: transport I/O, the channel
//! selection exchange, registry lookups and configuration. None of them is
//! ever reported to a client in-band; a failing session is simply closed.

use std::fmt;

use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Socket or file I/O failure
    Io(std::io::Error),
    /// Client violated the wire protocol
    Protocol(ProtocolError),
    /// Channel lookup failed
    Registry(RegistryError),
    /// Invalid configuration
    Config(String),
}

/// Errors raised while negotiating a channel selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Connection ended before a full selection value arrived
    IncompleteSelection {
        /// Bytes received before EOF
        received: usize,
    },
    /// No selection arrived within the selection timeout
    SelectionTimeout,
    /// Selection outside `0..channel_count`
    InvalidChannel {
        /// The value the client sent
        requested: i32,
        /// Number of configured channels
        channel_count: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Protocol(e) => Some(e),
            Error::Registry(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::IncompleteSelection { received } => {
                write!(f, "Incomplete channel selection ({} bytes)", received)
            }
            ProtocolError::SelectionTimeout => write!(f, "Channel selection timed out"),
            ProtocolError::InvalidChannel {
                requested,
                channel_count,
            } => write!(
                f,
                "Invalid channel {} (expected 0..{})",
                requested, channel_count
            ),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl Error {
    /// Whether this error came from the peer going away
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
