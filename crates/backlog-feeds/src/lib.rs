//! backlog-feeds — log file sources for backlog.
//!
//! A [`LogSource`] lists the day files of one channel in lexical name order and
//! opens each one as a stream of lines. Bytes that are not valid UTF-8 are
//! replaced with U+FFFD rather than failing the read.

pub mod file;
pub mod memory;

pub use file::{DirectorySource, LossyLines};
pub use memory::MemorySource;

use std::io::BufRead;
use thiserror::Error;

/// Errors raised while listing or opening log files.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The source directory does not exist or is not a directory.
    #[error("log directory not found: {0}")]
    NotFound(String),

    /// I/O error on `path`.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One day file offered by a source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogFile {
    /// File name only (`2023-10-10.log`); the date is derived from it.
    pub name: String,
}

impl LogFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A boxed reader over one file's contents.
pub type LineReader = LossyLines<Box<dyn BufRead + Send>>;

/// Trait implemented by each log source.
///
/// `Sync` so files can be opened from several worker threads.
pub trait LogSource: Send + Sync {
    /// Files to import, sorted by name.
    fn files(&self) -> Result<Vec<LogFile>, FeedError>;

    /// Open one of the files returned by [`files`](LogSource::files).
    fn open(&self, file: &LogFile) -> Result<LineReader, FeedError>;
}

/// Whether `name` carries `extension` (without the dot). Comparison is exact:
/// `2023-10-10.LOG` does not match `log`.
pub fn has_extension(name: &str, extension: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension)
}
