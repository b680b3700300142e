//! File-backed frame source

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::BufReader;

use super::FrameSource;

/// Reads frames from a text file, re-opening it on every pass
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for the file at `path`
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for FileSource {
    type Reader = BufReader<File>;

    async fn open(&self) -> io::Result<Self::Reader> {
        let file = File::open(&self.path).await?;
        Ok(BufReader::new(file))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn test_open_missing_file() {
        let source = FileSource::new("/nonexistent/framecast/missing.txt");
        let err = source.open().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_open_reads_from_start_each_time() {
        let path = std::env::temp_dir().join(format!("framecast-file-{}.txt", std::process::id()));
        tokio::fs::write(&path, b"---FRAME---\nhello\n").await.unwrap();
        let source = FileSource::new(&path);

        for _ in 0..2 {
            let mut text = String::new();
            source.open().await.unwrap().read_to_string(&mut text).await.unwrap();
            assert_eq!(text, "---FRAME---\nhello\n");
        }

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
