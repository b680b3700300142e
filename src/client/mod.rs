//! Frame stream client
//!
//! Provides the client side of the wire protocol for viewers, relays and
//! tests.

pub mod receiver;

pub use receiver::FrameClient;
