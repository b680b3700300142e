//! Frame stream client
//!
//! Connects to a frame server, selects a channel and yields each frame as
//! it arrives.

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::Result;
use crate::protocol::constants::FRAME_TERMINATOR;
use crate::protocol::encode_selection;

/// Client side of one channel stream
///
/// # Example
/// ```no_run
/// use framecast::client::FrameClient;
///
/// # async fn example() -> framecast::error::Result<()> {
/// let mut client = FrameClient::connect("127.0.0.1:12345", 0).await?;
///
/// while let Some(frame) = client.next_frame().await? {
///     print!("{}", String::from_utf8_lossy(&frame));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FrameClient {
    stream: BufReader<TcpStream>,
    channel: i32,
    buf: Vec<u8>,
}

impl FrameClient {
    /// Connect and send the channel selection
    pub async fn connect(addr: impl ToSocketAddrs, channel: i32) -> Result<Self> {
        let mut stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        stream.write_all(&encode_selection(channel)).await?;

        Ok(Self {
            stream: BufReader::new(stream),
            channel,
            buf: Vec::new(),
        })
    }

    /// Channel this client selected
    pub fn channel(&self) -> i32 {
        self.channel
    }

    /// Next frame without its terminator, or `None` once the server closes
    ///
    /// A partial frame cut off by the close is discarded.
    pub async fn next_frame(&mut self) -> Result<Option<Bytes>> {
        self.buf.clear();
        self.stream.read_until(FRAME_TERMINATOR, &mut self.buf).await?;

        match self.buf.last() {
            Some(&FRAME_TERMINATOR) => {
                let len = self.buf.len() - 1;
                Ok(Some(Bytes::copy_from_slice(&self.buf[..len])))
            }
            _ => Ok(None),
        }
    }
}
