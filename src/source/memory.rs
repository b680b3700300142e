//! In-memory frame source

use std::io::{self, Cursor};

use bytes::Bytes;

use super::FrameSource;

/// Serves the same text on every pass
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    data: Bytes,
}

impl MemorySource {
    /// Create a source from source-format text
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Build the source text for a list of frames, each between two markers
    pub fn from_frames<I, S>(name: impl Into<String>, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for frame in frames {
            text.push_str("---FRAME---\n");
            text.push_str(frame.as_ref());
            if !frame.as_ref().ends_with('\n') {
                text.push('\n');
            }
        }
        text.push_str("---FRAME---\n");
        Self::new(name, text)
    }
}

impl FrameSource for MemorySource {
    type Reader = Cursor<Bytes>;

    async fn open(&self) -> io::Result<Self::Reader> {
        Ok(Cursor::new(self.data.clone()))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}
