//! Splits source text into frames

use std::io;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::protocol::constants::FRAME_MARKER;
use crate::registry::frame::truncate_line;
use crate::registry::Frame;

/// Reads frames from one pass over a source
///
/// A frame is the run of lines between two `---FRAME---` markers. Lines
/// before the first marker and after the last one are not part of any
/// frame. Staging keeps at most `max_frame_lines` lines of at most
/// `max_line_len` bytes each; the rest of an over-long line is skipped
/// without being buffered.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    line: Vec<u8>,
    staged: Frame,
    max_frame_lines: usize,
    max_line_len: usize,
    /// Whether a marker has been seen in this pass
    in_frame: bool,
    done: bool,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    /// Wrap a reader positioned at the start of a source
    pub fn new(reader: R, max_frame_lines: usize, max_line_len: usize) -> Self {
        Self {
            reader,
            line: Vec::new(),
            staged: Frame::new(),
            max_frame_lines,
            max_line_len,
            in_frame: false,
            done: false,
        }
    }

    /// Next non-empty frame, or `None` at end of source
    pub async fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        if self.done {
            return Ok(None);
        }

        loop {
            if self.read_line().await? == 0 {
                // An unclosed frame is discarded
                self.done = true;
                self.staged.take();
                return Ok(None);
            }

            if self.line.starts_with(FRAME_MARKER) {
                let started = std::mem::replace(&mut self.in_frame, true);
                if started && !self.staged.is_empty() {
                    return Ok(Some(self.staged.take()));
                }
                continue;
            }

            if self.in_frame && self.staged.line_count() < self.max_frame_lines {
                let line = Bytes::copy_from_slice(&self.line);
                self.staged.push_line(truncate_line(&line, self.max_line_len));
            }
        }
    }

    /// Read one line into `self.line`, returning the bytes consumed
    ///
    /// Keeps the first bytes of the line, enough to hold `max_line_len`
    /// and to recognise a marker, plus the `\n` if there was one.
    async fn read_line(&mut self) -> io::Result<usize> {
        let limit = self.max_line_len.max(FRAME_MARKER.len());
        self.line.clear();
        let mut consumed = 0;

        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(consumed);
            }

            let (used, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            let body = if complete { used - 1 } else { used };
            let room = limit.saturating_sub(self.line.len());
            self.line.extend_from_slice(&available[..body.min(room)]);
            if complete {
                self.line.push(b'\n');
            }

            self.reader.consume(used);
            consumed += used;

            if complete {
                return Ok(consumed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    async fn collect(text: &str, max_lines: usize) -> Vec<String> {
        let source = Cursor::new(text.as_bytes().to_vec());
        let mut reader = FrameReader::new(source, max_lines, 255);
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().await.unwrap() {
            frames.push(
                frame
                    .lines()
                    .iter()
                    .map(|l| String::from_utf8_lossy(l).into_owned())
                    .collect(),
            );
        }
        frames
    }

    #[tokio::test]
    async fn test_frames_between_markers() {
        let frames = collect("---FRAME---\nA\n---FRAME---\nB\nb\n---FRAME---\n", 10).await;
        assert_eq!(frames, vec!["A\n", "B\nb\n"]);
    }

    #[tokio::test]
    async fn test_unclosed_frame_dropped() {
        let frames = collect("---FRAME---\nA\n---FRAME---\nB\n", 10).await;
        assert_eq!(frames, vec!["A\n"]);

        let frames = collect("---FRAME---\nA\n---FRAME---\nB", 10).await;
        assert_eq!(frames, vec!["A\n"]);
    }

    #[tokio::test]
    async fn test_preamble_ignored() {
        let frames = collect("title\n---FRAME---\nA\n---FRAME---\n", 10).await;
        assert_eq!(frames, vec!["A\n"]);
    }

    #[tokio::test]
    async fn test_empty_frames_skipped() {
        let frames = collect("---FRAME---\n---FRAME---\nA\n---FRAME---\n", 10).await;
        assert_eq!(frames, vec!["A\n"]);
    }

    #[tokio::test]
    async fn test_marker_prefix_match() {
        let frames = collect("---FRAME--- 1\nA\n---FRAME--- 2\nB\n---FRAME---end", 10).await;
        assert_eq!(frames, vec!["A\n", "B\n"]);
    }

    #[tokio::test]
    async fn test_extra_lines_dropped() {
        let frames = collect("---FRAME---\n1\n2\n3\n4\n---FRAME---\n5\n---FRAME---\n", 2).await;
        assert_eq!(frames, vec!["1\n2\n", "5\n"]);
    }

    #[tokio::test]
    async fn test_no_markers_no_frames() {
        assert!(collect("just text\nno markers\n", 10).await.is_empty());
        assert!(collect("", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_long_line_bounded_while_reading() {
        let mut text = b"---FRAME---\n".to_vec();
        text.extend(std::iter::repeat(b'x').take(1_000_000));
        text.extend_from_slice(b"\nshort\n---FRAME---\n");

        let mut reader = FrameReader::new(Cursor::new(text), 10, 16);
        let frame = reader.next_frame().await.unwrap().unwrap();

        assert_eq!(&frame.lines()[0][..], b"xxxxxxxxxxxxxxx\n");
        assert_eq!(&frame.lines()[1][..], b"short\n");
        assert!(reader.line.capacity() < 1024);
        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_marker_found_with_short_line_limit() {
        let text = b"---FRAME---\nabcdef\n---FRAME---\n".to_vec();
        let mut reader = FrameReader::new(Cursor::new(text), 10, 4);
        let frame = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(&frame.lines()[0][..], b"abc\n");
    }
}
