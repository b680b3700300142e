//! Wire protocol
//!
//! Clients select a channel with one big-endian integer and then receive a
//! raw push stream of frames, each followed by a form feed byte.

pub mod constants;
pub mod selection;

pub use selection::{decode_selection, encode_selection, read_selection, validate_selection};
