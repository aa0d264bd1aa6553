//! Store — the destination for [`NormalizedRecord`]s.
//!
//! A [`StoreWriter`] is owned by exactly one writer; every record of a run
//! passes through it in order. Records of one file are grouped between
//! [`begin_file`](StoreWriter::begin_file) and
//! [`commit_file`](StoreWriter::commit_file) so a backend can make each file
//! one transaction.

use crate::error::StoreError;
use crate::types::NormalizedRecord;

/// Appends normalized records to persistent storage.
///
/// A successful [`commit_file`](StoreWriter::commit_file) is authoritative: the
/// pipeline never re-reads the store to verify it.
pub trait StoreWriter {
    /// Start the group of records for `file`.
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError>;

    /// Write one record.
    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError>;

    /// Make everything appended since `begin_file` durable.
    fn commit_file(&mut self) -> Result<(), StoreError>;

    /// Discard everything appended since `begin_file`.
    fn rollback_file(&mut self) -> Result<(), StoreError>;
}

impl<W: StoreWriter + ?Sized> StoreWriter for &mut W {
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError> {
        (**self).begin_file(file)
    }

    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn commit_file(&mut self) -> Result<(), StoreError> {
        (**self).commit_file()
    }

    fn rollback_file(&mut self) -> Result<(), StoreError> {
        (**self).rollback_file()
    }
}

impl<W: StoreWriter + ?Sized> StoreWriter for Box<W> {
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError> {
        (**self).begin_file(file)
    }

    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn commit_file(&mut self) -> Result<(), StoreError> {
        (**self).commit_file()
    }

    fn rollback_file(&mut self) -> Result<(), StoreError> {
        (**self).rollback_file()
    }
}

/// In-memory store used by tests and `--dry-run`.
///
/// With `retain` off only counts are kept.
#[derive(Debug, Default)]
pub struct MemoryStore {
    retain: bool,
    open_file: Option<String>,
    pending: Vec<NormalizedRecord>,
    pending_count: usize,
    committed: Vec<NormalizedRecord>,
    committed_count: usize,
    committed_files: Vec<String>,
}

impl MemoryStore {
    /// A store that keeps every committed record.
    pub fn new() -> Self {
        Self {
            retain: true,
            ..Self::default()
        }
    }

    /// A store that only counts records.
    pub fn counting() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.committed
    }

    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.committed
    }

    pub fn len(&self) -> usize {
        self.committed_count
    }

    pub fn is_empty(&self) -> bool {
        self.committed_count == 0
    }

    /// Files committed so far, in commit order.
    pub fn committed_files(&self) -> &[String] {
        &self.committed_files
    }
}

impl StoreWriter for MemoryStore {
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError> {
        if self.open_file.is_some() {
            return Err(StoreError::Protocol("begin_file while a file is open"));
        }
        self.open_file = Some(file.to_string());
        Ok(())
    }

    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError> {
        if self.open_file.is_none() {
            return Err(StoreError::Protocol("append outside begin_file"));
        }
        if self.retain {
            self.pending.push(record.clone());
        }
        self.pending_count += 1;
        Ok(())
    }

    fn commit_file(&mut self) -> Result<(), StoreError> {
        let file = self
            .open_file
            .take()
            .ok_or(StoreError::Protocol("commit_file without begin_file"))?;
        self.committed.append(&mut self.pending);
        self.committed_count += std::mem::take(&mut self.pending_count);
        self.committed_files.push(file);
        Ok(())
    }

    fn rollback_file(&mut self) -> Result<(), StoreError> {
        self.open_file
            .take()
            .ok_or(StoreError::Protocol("rollback_file without begin_file"))?;
        self.pending.clear();
        self.pending_count = 0;
        Ok(())
    }
}
