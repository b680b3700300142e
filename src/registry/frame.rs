//! Frame and channel identifier types

use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::constants::FRAME_TERMINATOR;

/// Index of a channel, `0..channel_count`
pub type ChannelId = usize;

/// Shorten `line` to at most `max_len` bytes
///
/// A line that ended in `\n` still ends in `\n` after truncation so the
/// lines that follow it keep their place on screen.
pub(crate) fn truncate_line(line: &Bytes, max_len: usize) -> Bytes {
    if line.len() <= max_len {
        return line.clone();
    }
    if max_len == 0 || !line.ends_with(b"\n") {
        return line.slice(..max_len);
    }

    let mut buf = BytesMut::with_capacity(max_len);
    buf.put_slice(&line[..max_len - 1]);
    buf.put_u8(b'\n');
    buf.freeze()
}

/// One screen of text content
///
/// A frame is an ordered list of lines. Lines are raw bytes and keep
/// whatever line terminator the source had, so concatenating them gives
/// back the source text. An empty line marks the end of a frame once it
/// has been stored in a [`ChannelBuffer`](super::ChannelBuffer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<Bytes>,
}

impl Frame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame from a list of lines
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Bytes>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a line
    pub fn push_line(&mut self, line: impl Into<Bytes>) {
        self.lines.push(line.into());
    }

    /// Lines in order
    pub fn lines(&self) -> &[Bytes] {
        &self.lines
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the frame has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total size of all lines in bytes
    pub fn byte_len(&self) -> usize {
        self.lines.iter().map(Bytes::len).sum()
    }

    /// Take the lines out, leaving the frame empty
    pub fn take(&mut self) -> Frame {
        Frame {
            lines: std::mem::take(&mut self.lines),
        }
    }

    /// Wire payload: all lines followed by the frame terminator
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.byte_len() + 1);
        for line in &self.lines {
            buf.put_slice(line);
        }
        buf.put_u8(FRAME_TERMINATOR);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_terminator() {
        let frame = Frame::from_lines(["ab\n", "cd\n"]);
        assert_eq!(&frame.encode()[..], b"ab\ncd\n\x0c");
    }

    #[test]
    fn test_encode_empty_frame() {
        assert_eq!(&Frame::new().encode()[..], &[FRAME_TERMINATOR]);
    }

    #[test]
    fn test_truncate_keeps_terminator() {
        let line = Bytes::from_static(b"0123456789\n");

        assert_eq!(&truncate_line(&line, 5)[..], b"0123\n");
        assert_eq!(&truncate_line(&line, 1)[..], b"\n");
        assert_eq!(&truncate_line(&line, 11)[..], b"0123456789\n");
        assert_eq!(&truncate_line(&Bytes::from_static(b"abcdef"), 3)[..], b"abc");
    }

    #[test]
    fn test_take_resets() {
        let mut frame = Frame::from_lines(["x\n"]);
        let taken = frame.take();

        assert!(frame.is_empty());
        assert_eq!(taken.line_count(), 1);
        assert_eq!(taken.byte_len(), 2);
    }
}
