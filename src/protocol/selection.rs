//! Channel selection exchange
//!
//! The only message a client ever sends is its channel choice, written once
//! right after connecting:
//!
//! ```text
//! Client                                   Server
//!   |                                        |
//!   |---- channel id (4 bytes, i32 BE) ---->|
//!   |                                        |
//!   |<--------- frame 0x0C ------------------|
//!   |<--------- frame 0x0C ------------------|
//!   |                 ...                    |
//! ```
//!
//! An out-of-range id gets the connection closed with nothing written back.

use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProtocolError, Result};
use crate::protocol::constants::CHANNEL_SELECTION_SIZE;

/// Encode a channel selection for the wire
pub fn encode_selection(channel: i32) -> Bytes {
    let mut buf = BytesMut::with_capacity(CHANNEL_SELECTION_SIZE);
    buf.put_i32(channel);
    buf.freeze()
}

/// Decode a channel selection if enough bytes are buffered
///
/// Consumes exactly [`CHANNEL_SELECTION_SIZE`] bytes on success and leaves
/// the buffer untouched otherwise.
pub fn decode_selection(buf: &mut BytesMut) -> Option<i32> {
    if buf.len() < CHANNEL_SELECTION_SIZE {
        return None;
    }
    Some(buf.get_i32())
}

/// Read a channel selection from the peer
///
/// Fails with [`ProtocolError::IncompleteSelection`] if the peer closes
/// before sending a full value and with [`ProtocolError::SelectionTimeout`]
/// if nothing complete arrives within `timeout`.
pub async fn read_selection<R>(reader: &mut R, timeout: Duration) -> Result<i32>
where
    R: AsyncRead + Unpin,
{
    match tokio::time::timeout(timeout, read_selection_inner(reader)).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::SelectionTimeout.into()),
    }
}

async fn read_selection_inner<R>(reader: &mut R) -> Result<i32>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(CHANNEL_SELECTION_SIZE);

    loop {
        if let Some(channel) = decode_selection(&mut buf) {
            return Ok(channel);
        }

        // Cap the read so bytes after the selection stay in the socket
        let remaining = (CHANNEL_SELECTION_SIZE - buf.len()) as u64;
        let n = (&mut *reader).take(remaining).read_buf(&mut buf).await?;
        if n == 0 {
            return Err(ProtocolError::IncompleteSelection {
                received: buf.len(),
            }
            .into());
        }
    }
}

/// Check a requested channel against the configured channel count
pub fn validate_selection(
    requested: i32,
    channel_count: usize,
) -> std::result::Result<usize, ProtocolError> {
    usize::try_from(requested)
        .ok()
        .filter(|&id| id < channel_count)
        .ok_or(ProtocolError::InvalidChannel {
            requested,
            channel_count,
        })
}
