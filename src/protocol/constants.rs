//! Wire and frame format constants

use std::time::Duration;

/// Byte appended after every frame payload (form feed)
pub const FRAME_TERMINATOR: u8 = 0x0C;

/// Size of the channel selection sent by the client (big-endian i32)
pub const CHANNEL_SELECTION_SIZE: usize = 4;

/// Line prefix that separates frames in a source
pub const FRAME_MARKER: &[u8] = b"---FRAME---";

/// Default listening port
pub const DEFAULT_PORT: u16 = 12345;

/// Default number of frame slots per channel buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;

/// Default maximum number of lines in one frame
pub const DEFAULT_MAX_FRAME_LINES: usize = 100;

/// Default maximum length of one line in bytes
pub const DEFAULT_MAX_LINE_LEN: usize = 255;

/// Default pause between two frames sent to a client
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Default wait before re-opening an unavailable source
pub const DEFAULT_SOURCE_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Default time a client has to send its channel selection
pub const DEFAULT_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);
