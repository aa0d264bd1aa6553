//! Directory source — one bouncer log file per day in a flat directory.
//!
//! Only regular files whose extension matches are listed; subdirectories and
//! other files are skipped silently. Names are sorted lexically, which is
//! chronological for `YYYY-MM-DD.log` names.

use crate::{has_extension, FeedError, LineReader, LogFile, LogSource};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads day files from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LogSource for DirectorySource {
    fn files(&self) -> Result<Vec<LogFile>, FeedError> {
        if !self.dir.is_dir() {
            return Err(FeedError::NotFound(self.dir.display().to_string()));
        }
        let io_err = |source| FeedError::Io {
            path: self.dir.display().to_string(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };
            if has_extension(&name, &self.extension) {
                files.push(LogFile::new(name));
            } else {
                debug!(file = %name, "skipping file without .{} extension", self.extension);
            }
        }

        // Sort for deterministic processing order
        files.sort();
        Ok(files)
    }

    fn open(&self, file: &LogFile) -> Result<LineReader, FeedError> {
        let path = self.dir.join(&file.name);
        let handle = File::open(&path).map_err(|source| FeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let reader: Box<dyn BufRead + Send> = Box::new(BufReader::new(handle));
        Ok(LossyLines::new(reader))
    }
}

/// Line iterator that decodes invalid UTF-8 lossily instead of failing.
///
/// Yields lines without their `\n` / `\r\n` terminator. After an I/O error the
/// iterator is exhausted.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
