//! Frame sources and the producer task that drains them
//!
//! A source is anything that can be opened repeatedly and read as text.
//! The [`Producer`] re-opens it after every pass, so a finite source plays
//! as a looping animation.
//!
//! # Source format
//!
//! ```text
//! ---FRAME---
//!  o
//! /|\
//! ---FRAME---
//! \o/
//!  |
//! ---FRAME---
//! ```
//!
//! A frame is the text between two lines starting with `---FRAME---`.
//! Text before the first marker or after the last one is ignored, so a
//! file should end with a marker.

pub mod file;
pub mod memory;
pub mod producer;
pub mod reader;

use std::future::Future;
use std::io;

use tokio::io::AsyncBufRead;

pub use file::FileSource;
pub use memory::MemorySource;
pub use producer::Producer;
pub use reader::FrameReader;

/// A restartable supply of frame text for one channel
pub trait FrameSource: Send + Sync + 'static {
    /// Reader returned for one pass
    type Reader: AsyncBufRead + Unpin + Send;

    /// Open the source from the beginning
    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send;

    /// Human-readable name used in logs
    fn describe(&self) -> String;
}
