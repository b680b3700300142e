//! # framecast
//!
//! A multi-channel text frame streaming server.
//!
//! Each channel loops over a text source (typically an ASCII animation
//! file), keeps up to a fixed number of frames in a bounded ring buffer and
//! streams them to every client that selects it:
//!
//! ```text
//! FrameSource ──► Producer ──► ChannelBuffer ──► Connection ──► TCP
//!                                    │
//!                                    └─────────► Connection ──► TCP
//! ```
//!
//! A producer waits when its buffer is full, and a session waits when it
//! is empty. Clients select a channel with one big-endian `i32` and then
//! receive frames separated by form feed (`0x0C`) bytes.
//!
//! Sessions on the same channel share one read cursor, so each frame goes
//! to exactly one of them. See [`registry`] for details.
//!
//! ## Example
//!
//! ```no_run
//! use framecast::{FrameServer, ServerConfig};
//!
//! # async fn example() -> framecast::error::Result<()> {
//! let config = ServerConfig::default()
//!     .port(12345)
//!     .channel("animations/juggler.txt")
//!     .channel("animations/rain.txt");
//!
//! let server = FrameServer::new(config)?;
//! server.run().await
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod source;
pub mod stats;

pub use client::FrameClient;
pub use error::{Error, Result};
pub use registry::{ChannelBuffer, ChannelRegistry, Frame, RegistryConfig};
pub use server::{FrameServer, ServerConfig};
pub use source::{FileSource, FrameSource, MemorySource};
