//! In-memory source — day files held as byte buffers. Used by tests and
//! benchmarks in place of a directory on disk.

use crate::{FeedError, LineReader, LogFile, LogSource, LossyLines};
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file.
    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), contents.into());
        self
    }
}

impl LogSource for MemorySource {
    fn files(&self) -> Result<Vec<LogFile>, FeedError> {
        Ok(self.files.keys().map(LogFile::new).collect())
    }

    fn open(&self, file: &LogFile) -> Result<LineReader, FeedError> {
        let bytes = self.files.get(&file.name).ok_or_else(|| FeedError::Io {
            path: file.name.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })?;
        let reader: Box<dyn BufRead + Send> = Box::new(Cursor::new(bytes.clone()));
        Ok(LossyLines::new(reader))
    }
}
