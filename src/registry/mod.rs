//! Channel registry
//!
//! The registry owns every channel's bounded frame buffer. Each buffer is
//! fed by exactly one producer and drained by every session streaming that
//! channel.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<ChannelRegistry>
//!                     ┌─────────────────────────┐
//!                     │ channels: Vec<          │
//!                     │   ChannelEntry {        │
//!                     │     buffer: ring[C],    │
//!                     │     stats,              │
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Producer]               [Session]               [Session]
//!    buffer.push()            buffer.pop()            buffer.pop()
//!         │                       │                       │
//!    FrameSource                 TCP                     TCP
//! ```
//!
//! # Shared consumption
//!
//! Sessions on the same channel share the buffer's read cursor. With N
//! clients watching one channel, every frame is delivered to exactly one of
//! them, so each client sees roughly every N-th frame. The buffer behaves as
//! a work queue, not a broadcast.

pub mod buffer;
pub mod config;
pub mod entry;
pub mod error;
pub mod frame;
pub mod store;

pub use buffer::ChannelBuffer;
pub use config::RegistryConfig;
pub use entry::{ChannelEntry, ChannelStats};
pub use error::RegistryError;
pub use frame::{ChannelId, Frame};
pub use store::ChannelRegistry;
