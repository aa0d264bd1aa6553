//! Fault injection — a store that fails on demand, a source whose reads
//! break part way through a file, and one that trips a cancel token while a
//! file is being read.

use backlog::{
    CancelToken, FeedError, LogFile, LogSource, MemoryStore, NormalizedRecord, StoreError, StoreWriter,
};
use backlog_feeds::{LineReader, LossyLines};
use std::io::{self, BufRead, Read};

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryStore`] and refuses the `n`th append (0-based) of the run.
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_at: usize,
    appends: usize,
    pub rollbacks: usize,
}

impl FailingStore {
    pub fn failing_at(fail_at: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_at,
            appends: 0,
            rollbacks: 0,
        }
    }
}

impl StoreWriter for FailingStore {
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError> {
        self.inner.begin_file(file)
    }

    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError> {
        let n = self.appends;
        self.appends += 1;
        if n == self.fail_at {
            return Err(StoreError::Rejected("disk full".into()));
        }
        self.inner.append(record)
    }

    fn commit_file(&mut self) -> Result<(), StoreError> {
        self.inner.commit_file()
    }

    fn rollback_file(&mut self) -> Result<(), StoreError> {
        self.rollbacks += 1;
        self.inner.rollback_file()
    }
}

// ---------------------------------------------------------------------------
// CancellingStore
// ---------------------------------------------------------------------------

/// Trips `cancel` once `after` records have been appended, the way a Ctrl+C
/// arriving mid-file would.
pub struct CancellingStore {
    pub inner: MemoryStore,
    cancel: CancelToken,
    after: usize,
    appends: usize,
}

impl CancellingStore {
    pub fn new(cancel: CancelToken, after: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            cancel,
            after,
            appends: 0,
        }
    }
}

impl StoreWriter for CancellingStore {
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError> {
        self.inner.begin_file(file)
    }

    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError> {
        self.inner.append(record)?;
        self.appends += 1;
        if self.appends == self.after {
            self.cancel.cancel();
        }
        Ok(())
    }

    fn commit_file(&mut self) -> Result<(), StoreError> {
        self.inner.commit_file()
    }

    fn rollback_file(&mut self) -> Result<(), StoreError> {
        self.inner.rollback_file()
    }
}

// ---------------------------------------------------------------------------
// BrokenSource
// ---------------------------------------------------------------------------

/// Delegates to `inner` but every read of `broken` fails after the first
/// `good_bytes` bytes.
pub struct BrokenSource<S> {
    pub inner: S,
    pub broken: String,
    pub good_bytes: usize,
}

struct BreakingReader {
    data: io::Cursor<Vec<u8>>,
    limit: u64,
}

impl Read for BreakingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.fill_buf()?.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data.get_ref()[self.data.position() as usize..][..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for BreakingReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.data.position() >= self.limit {
            return Err(io::Error::other("device went away"));
        }
        let start = self.data.position() as usize;
        let end = self.limit as usize;
        Ok(&self.data.get_ref()[start..end])
    }

    fn consume(&mut self, amt: usize) {
        let pos = self.data.position();
        self.data.set_position(pos + amt as u64);
    }
}

/// Re-reads `file` from `inner` as newline-terminated bytes.
fn contents<S: LogSource>(inner: &S, file: &LogFile) -> Result<Vec<u8>, FeedError> {
    let mut bytes = Vec::new();
    for line in inner.open(file)? {
        let line = line.map_err(|source| FeedError::Io {
            path: file.name.clone(),
            source,
        })?;
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
    }
    Ok(bytes)
}

impl<S: LogSource> LogSource for BrokenSource<S> {
    fn files(&self) -> Result<Vec<LogFile>, FeedError> {
        self.inner.files()
    }

    fn open(&self, file: &LogFile) -> Result<LineReader, FeedError> {
        if file.name != self.broken {
            return self.inner.open(file);
        }
        let bytes = contents(&self.inner, file)?;
        let limit = self.good_bytes.min(bytes.len()) as u64;
        let reader: Box<dyn BufRead + Send> = Box::new(BreakingReader {
            data: io::Cursor::new(bytes),
            limit,
        });
        Ok(LossyLines::new(reader))
    }
}

// ---------------------------------------------------------------------------
// InterruptedSource
// ---------------------------------------------------------------------------

/// Delegates to `inner` but trips `cancel` once `after_bytes` bytes of
/// `interrupted` have been handed out, the way a Ctrl+C arriving while a file
/// is still being read would.
pub struct InterruptedSource<S> {
    pub inner: S,
    pub interrupted: String,
    pub after_bytes: u64,
    pub cancel: CancelToken,
}

struct TrippingReader {
    data: io::Cursor<Vec<u8>>,
    after_bytes: u64,
    cancel: CancelToken,
}

impl TrippingReader {
    fn trip(&self) {
        if self.data.position() >= self.after_bytes {
            self.cancel.cancel();
        }
    }
}

impl Read for TrippingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.trip();
        self.data.read(buf)
    }
}

impl BufRead for TrippingReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.trip();
        self.data.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.data.consume(amt);
    }
}

impl<S: LogSource> LogSource for InterruptedSource<S> {
    fn files(&self) -> Result<Vec<LogFile>, FeedError> {
        self.inner.files()
    }

    fn open(&self, file: &LogFile) -> Result<LineReader, FeedError> {
        if file.name != self.interrupted {
            return self.inner.open(file);
        }
        let reader: Box<dyn BufRead + Send> = Box::new(TrippingReader {
            data: io::Cursor::new(contents(&self.inner, file)?),
            after_bytes: self.after_bytes,
            cancel: self.cancel.clone(),
        });
        Ok(LossyLines::new(reader))
    }
}
