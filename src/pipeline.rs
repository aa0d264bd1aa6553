//! Ingestion pipeline — runs every day file of a source through the
//! per-line layers and hands the records to one [`StoreWriter`].
//!
//! Each file goes through two phases:
//!
//! 1. **Normalise** (may run on a worker thread): derive the date from the
//!    file name, read lines in order, parse → classify → timestamp → encode.
//!    Produces a [`FileOutcome`] holding the records and a partial report.
//! 2. **Commit** (always on the calling thread): write the records in line
//!    order inside one store transaction, then fold the partial report into
//!    the run's report.
//!
//! Bad lines never stop a file and bad files never stop a run. Only store
//! failures and an unreadable source are fatal; a store failure carries the
//! report of what was committed before it.

use crate::cancel::CancelToken;
use crate::error::{PipelineError, Result};
use backlog_core::report::EventCounts;
use backlog_core::{
    FileDate, ImportConfig, ImportMode, IngestionReport, NormalizedRecord, Normalizer, Position,
    RawLogLine, RejectReason, StoreError, StoreWriter, TimestampNormalizer,
};
use backlog_feeds::{has_extension, DirectorySource, LogFile, LogSource};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Orchestrates an import into `W`.
pub struct IngestionPipeline<W> {
    config: ImportConfig,
    normalizer: Normalizer,
    store: W,
    cancel: CancelToken,
}

/// Result of normalising one file, before anything is written.
#[derive(Debug)]
struct FileOutcome {
    file: String,
    /// The file was rejected as a whole; `records` is empty.
    skipped: bool,
    /// `(line number, record)` in read order.
    records: Vec<(usize, NormalizedRecord)>,
    report: IngestionReport,
    /// Read failure that cut the file short.
    io_error: Option<String>,
    /// The token was tripped while the file was being read.
    cancelled: bool,
}

impl FileOutcome {
    fn new(file: &str) -> Self {
        let report = IngestionReport {
            files_seen: 1,
            ..IngestionReport::default()
        };
        Self {
            file: file.to_string(),
            skipped: false,
            records: Vec::new(),
            report,
            io_error: None,
            cancelled: false,
        }
    }

    fn skip(mut self, reason: RejectReason, detail: Option<String>) -> Self {
        warn!(file = %self.file, %reason, "skipping file");
        self.report.reject_file(&self.file, reason, detail);
        self.skipped = true;
        self
    }
}

impl<W: StoreWriter> IngestionPipeline<W> {
    pub fn new(config: ImportConfig, store: W) -> Self {
        let normalizer = Normalizer::new(
            config.network_id.clone(),
            config.channel.clone(),
            TimestampNormalizer::new(config.timezone),
        );
        Self {
            config,
            normalizer,
            store,
            cancel: CancelToken::new(),
        }
    }

    /// Use `cancel` to stop the run from another thread.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn store(&self) -> &W {
        &self.store
    }

    pub fn into_store(self) -> W {
        self.store
    }

    /// Import every matching file in `dir`.
    pub fn run_dir(&mut self, dir: &Path) -> Result<IngestionReport> {
        let source = DirectorySource::new(dir, self.config.extension.clone());
        self.run(&source)
    }

    /// Import every file offered by `source`, in name order.
    pub fn run<S: LogSource + ?Sized>(&mut self, source: &S) -> Result<IngestionReport> {
        let mut files = source.files()?;
        files.retain(|file| {
            let keep = has_extension(&file.name, &self.config.extension);
            if !keep {
                debug!(file = %file.name, "ignoring file with other extension");
            }
            keep
        });
        files.sort();
        info!(
            files = files.len(),
            workers = self.config.workers,
            mode = ?self.config.mode,
            network = %self.config.network_id,
            channel = %self.config.channel,
            "starting import"
        );

        let mut report = IngestionReport::new();
        if self.config.workers <= 1 {
            self.run_sequential(source, &files, &mut report)?;
        } else {
            self.run_parallel(source, &files, &mut report)?;
        }

        info!(
            files = report.files_seen,
            written = report.records_written(),
            rejected = report.rejections.len(),
            cancelled = report.is_cancelled(),
            "import finished"
        );
        Ok(report)
    }

    fn run_sequential<S: LogSource + ?Sized>(
        &mut self,
        source: &S,
        files: &[LogFile],
        report: &mut IngestionReport,
    ) -> Result<()> {
        for file in files {
            if self.stop_before(file, report) {
                break;
            }
            let outcome = normalize_file(&self.normalizer, source, file, &self.cancel);
            self.commit(outcome, report).map_err(|e| store_failure(e, report))?;
            if report.is_cancelled() {
                break;
            }
        }
        Ok(())
    }

    /// Normalise `workers` files at a time in parallel, then commit them in
    /// name order. Chunking bounds how many files are held in memory.
    fn run_parallel<S: LogSource + ?Sized>(
        &mut self,
        source: &S,
        files: &[LogFile],
        report: &mut IngestionReport,
    ) -> Result<()> {
        let workers = self.config.workers;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("backlog-worker-{i}"))
            .build()?;

        for chunk in files.chunks(workers) {
            if self.stop_before(&chunk[0], report) {
                break;
            }
            let normalizer = &self.normalizer;
            let cancel = &self.cancel;
            let outcomes: Vec<FileOutcome> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|file| normalize_file(normalizer, source, file, cancel))
                    .collect()
            });
            for outcome in outcomes {
                self.commit(outcome, report).map_err(|e| store_failure(e, report))?;
                if report.is_cancelled() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn stop_before(&self, file: &LogFile, report: &mut IngestionReport) -> bool {
        if !self.cancel.is_cancelled() {
            return false;
        }
        info!(file = %file.name, "cancelled before file");
        report.cancelled = Some(Position {
            file: file.name.clone(),
            line: None,
        });
        true
    }

    /// Write one file's records and fold its report into `report`.
    fn commit(
        &mut self,
        outcome: FileOutcome,
        report: &mut IngestionReport,
    ) -> std::result::Result<(), StoreError> {
        let FileOutcome {
            file,
            skipped,
            records,
            report: partial,
            io_error,
            cancelled: read_cancelled,
        } = outcome;
        let rejected_lines = partial.rejected_lines();
        report.absorb(partial);
        if skipped {
            return Ok(());
        }
        if read_cancelled {
            // A partly read file is never written.
            info!(file = %file, "cancelled while reading file");
            report.cancelled = Some(Position { file, line: None });
            return Ok(());
        }

        if let Some(detail) = &io_error {
            warn!(file = %file, error = %detail, "file read failed part way");
        }

        if self.config.mode == ImportMode::Strict && (rejected_lines > 0 || io_error.is_some()) {
            let detail = match &io_error {
                Some(e) => format!("{rejected_lines} rejected lines, read error: {e}"),
                None => format!("{rejected_lines} rejected lines"),
            };
            warn!(file = %file, rejected_lines, "strict mode: holding back file");
            report.reject_file(&file, RejectReason::StrictModeHeldBack, Some(detail));
            return Ok(());
        }
        if let Some(detail) = io_error {
            report.note_file(&file, RejectReason::IoError, Some(detail));
        }

        self.store.begin_file(&file)?;
        let mut appended = EventCounts::default();
        let mut last_line = None;
        let mut cancelled = false;
        for (line, record) in &records {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if let Err(e) = self.store.append(record) {
                warn!(file = %file, line, error = %e, "store write failed, rolling back file");
                if let Err(rollback) = self.store.rollback_file() {
                    warn!(file = %file, error = %rollback, "rollback failed");
                }
                return Err(e);
            }
            appended.increment(record.kind);
            last_line = Some(*line);
        }

        if cancelled && (self.config.mode == ImportMode::Strict || appended.total() == 0) {
            self.store.rollback_file()?;
            info!(file = %file, "cancelled, rolled back partial file");
            last_line = None;
        } else {
            self.store.commit_file()?;
            report.written.merge(&appended);
            report.files_ingested += 1;
            info!(
                file = %file,
                records = appended.total(),
                rejected = rejected_lines,
                "imported file"
            );
        }

        if cancelled {
            report.cancelled = Some(Position {
                file,
                line: last_line,
            });
        }
        Ok(())
    }
}

fn store_failure(source: StoreError, report: &IngestionReport) -> PipelineError {
    PipelineError::Store {
        source,
        report: Box::new(report.clone()),
    }
}

/// Phase one for a single file. Never fails: every problem ends up in the
/// outcome's report.
fn normalize_file<S: LogSource + ?Sized>(
    normalizer: &Normalizer,
    source: &S,
    file: &LogFile,
    cancel: &CancelToken,
) -> FileOutcome {
    let outcome = FileOutcome::new(&file.name);
    let date = match FileDate::from_file_name(&file.name) {
        Ok(date) => date,
        Err(reason) => return outcome.skip(reason, None),
    };
    let lines = match source.open(file) {
        Ok(lines) => lines,
        Err(e) => return outcome.skip(RejectReason::IoError, Some(e.to_string())),
    };

    let mut outcome = outcome;
    let mut previous_ts: Option<i64> = None;
    for (idx, line) in lines.enumerate() {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }
        let line_number = idx + 1;
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                outcome.io_error = Some(format!("line {line_number}: {e}"));
                break;
            }
        };
        outcome.report.lines_read += 1;

        let raw = RawLogLine {
            source_file: file.name.clone(),
            file_date: date.date(),
            line_number,
            text,
        };
        match normalizer.normalize_raw(&raw) {
            Ok(normalized) => {
                let ts = normalized.record.timestamp_ms;
                if previous_ts.is_some_and(|prev| ts < prev) {
                    warn!(
                        file = %raw.source_file,
                        line = line_number,
                        "timestamp earlier than previous line; log may span midnight"
                    );
                    outcome.report.clock_regressions += 1;
                }
                previous_ts = Some(ts);
                outcome.report.record_event(normalized.record.kind);
                outcome.records.push((line_number, normalized.record));
            }
            Err(reason) => {
                debug!(file = %raw.source_file, line = line_number, %reason, "rejected line");
                outcome.report.reject_line(&raw.source_file, line_number, reason);
            }
        }
    }
    outcome
}
