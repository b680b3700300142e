//! Frame streaming server
//!
//! [`FrameServer`] accepts TCP connections and runs one
//! [`Connection`](connection::Connection) task per client. Producers for
//! the configured channels start together with the accept loop.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::FrameServer;
