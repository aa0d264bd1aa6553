//! Ingestion report — the structured summary returned by an import run.
//!
//! The report replaces ad hoc console warnings: every skipped line or file is
//! recorded as a [`Rejection`] with its file, line number and [`RejectReason`],
//! so callers can assert on it in tests or print it for manual review.

use crate::types::EventKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a line (or a whole file) was excluded from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// Line does not start with `[HH:MM:SS] `.
    NoTimestampPrefix,
    /// Regular line without a `<nick>` marker, or with an empty one.
    MissingSender,
    /// `***` status line without a usable subject nick.
    MalformedStatusLine,
    /// File name does not encode a calendar date.
    UnparseableFileDate,
    /// Event reached the encoder without a nick.
    EmptyNick,
    /// Event could not be serialized into the destination shape.
    InvalidPayload,
    /// Strict mode: the file contained rejected lines, nothing was written.
    StrictModeHeldBack,
    /// The file could not be opened or read to the end.
    IoError,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::NoTimestampPrefix => "no-timestamp-prefix",
            RejectReason::MissingSender => "missing-sender",
            RejectReason::MalformedStatusLine => "malformed-status-line",
            RejectReason::UnparseableFileDate => "unparseable-file-date",
            RejectReason::EmptyNick => "empty-nick",
            RejectReason::InvalidPayload => "invalid-payload",
            RejectReason::StrictModeHeldBack => "strict-mode-held-back",
            RejectReason::IoError => "io-error",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected line or file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub file: String,
    /// `None` for file-level rejections.
    pub line: Option<usize>,
    pub reason: RejectReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Where a cancelled run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub file: String,
    /// Line of the last record written from `file`; `None` when nothing
    /// from it was written.
    pub line: Option<usize>,
}

/// Per-kind event counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub message: usize,
    pub join: usize,
    pub part: usize,
    pub quit: usize,
}

impl EventCounts {
    pub fn increment(&mut self, kind: EventKind) {
        *self.slot(kind) += 1;
    }

    pub fn get(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Message => self.message,
            EventKind::Join => self.join,
            EventKind::Part => self.part,
            EventKind::Quit => self.quit,
        }
    }

    pub fn total(&self) -> usize {
        self.message + self.join + self.part + self.quit
    }

    fn slot(&mut self, kind: EventKind) -> &mut usize {
        match kind {
            EventKind::Message => &mut self.message,
            EventKind::Join => &mut self.join,
            EventKind::Part => &mut self.part,
            EventKind::Quit => &mut self.quit,
        }
    }

    pub fn merge(&mut self, other: &EventCounts) {
        for kind in EventKind::ALL {
            *self.slot(kind) += other.get(kind);
        }
    }
}

/// Accumulated statistics for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Files handed to the pipeline (after extension filtering).
    pub files_seen: usize,
    /// Files whose records were committed to the store.
    pub files_ingested: usize,
    /// Files rejected as a whole (bad date, strict hold-back, I/O failure).
    pub files_skipped: usize,
    pub lines_read: usize,
    /// Events produced by classification, per kind.
    pub events: EventCounts,
    /// Records acknowledged by the store, per kind.
    pub written: EventCounts,
    /// Lines whose timestamp is earlier than the previous line of the same
    /// file (typically a log spanning midnight).
    pub clock_regressions: usize,
    pub rejections: Vec<Rejection>,
    pub cancelled: Option<Position>,
}

impl IngestionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self, kind: EventKind) {
        self.events.increment(kind);
    }

    pub fn record_written(&mut self, kind: EventKind) {
        self.written.increment(kind);
    }

    pub fn reject_line(&mut self, file: &str, line: usize, reason: RejectReason) {
        self.rejections.push(Rejection {
            file: file.to_string(),
            line: Some(line),
            reason,
            detail: None,
        });
    }

    /// Skip a whole file.
    pub fn reject_file(&mut self, file: &str, reason: RejectReason, detail: Option<String>) {
        self.files_skipped += 1;
        self.note_file(file, reason, detail);
    }

    /// Record a file-level problem for a file that was still (partly)
    /// imported, such as a read error halfway through.
    pub fn note_file(&mut self, file: &str, reason: RejectReason, detail: Option<String>) {
        self.rejections.push(Rejection {
            file: file.to_string(),
            line: None,
            reason,
            detail,
        });
    }

    pub fn records_written(&self) -> usize {
        self.written.total()
    }

    /// Line-level rejections only.
    pub fn rejected_lines(&self) -> usize {
        self.rejections.iter().filter(|r| r.line.is_some()).count()
    }

    pub fn rejection_counts(&self) -> BTreeMap<RejectReason, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.rejections {
            *counts.entry(r.reason).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }

    /// Fold a per-file partial report into this one. Rejections keep their
    /// order, so merging per-file reports in file order is deterministic.
    pub fn absorb(&mut self, other: IngestionReport) {
        self.files_seen += other.files_seen;
        self.files_ingested += other.files_ingested;
        self.files_skipped += other.files_skipped;
        self.lines_read += other.lines_read;
        self.events.merge(&other.events);
        self.written.merge(&other.written);
        self.clock_regressions += other.clock_regressions;
        self.rejections.extend(other.rejections);
        if self.cancelled.is_none() {
            self.cancelled = other.cancelled;
        }
    }
}

impl fmt::Display for IngestionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "files: {} seen, {} ingested, {} skipped",
            self.files_seen, self.files_ingested, self.files_skipped
        )?;
        writeln!(f, "lines read: {}", self.lines_read)?;
        writeln!(f, "records written: {}", self.records_written())?;
        for kind in EventKind::ALL {
            writeln!(
                f,
                "  {:<8} {:>8} written / {:>8} classified",
                kind.as_str(),
                self.written.get(kind),
                self.events.get(kind)
            )?;
        }
        if self.clock_regressions > 0 {
            writeln!(f, "clock regressions: {}", self.clock_regressions)?;
        }
        writeln!(f, "rejections: {}", self.rejections.len())?;
        for (reason, count) in self.rejection_counts() {
            writeln!(f, "  {:<24} {:>8}", reason.as_str(), count)?;
        }
        for r in &self.rejections {
            match (r.line, &r.detail) {
                (Some(line), _) => writeln!(f, "  {}:{}: {}", r.file, line, r.reason)?,
                (None, Some(detail)) => writeln!(f, "  {}: {} ({})", r.file, r.reason, detail)?,
                (None, None) => writeln!(f, "  {}: {}", r.file, r.reason)?,
            }
        }
        if let Some(pos) = &self.cancelled {
            match pos.line {
                Some(line) => writeln!(f, "cancelled after {}:{}", pos.file, line)?,
                None => writeln!(f, "cancelled at {} (nothing written from it)", pos.file)?,
            }
        }
        Ok(())
    }
}
