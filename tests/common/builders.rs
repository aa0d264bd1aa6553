//! Test builders — ergonomic constructors for day files, sources and
//! pipelines.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use backlog::{ImportConfig, IngestionPipeline, MemorySource, MemoryStore};
use std::path::Path;
use tempfile::TempDir;

pub const NETWORK: &str = "5c8b5a2e-0f1d-4d6e-9b3a-2f7e1c0d4a9b";
pub const CHANNEL: &str = "#rust";

// ---------------------------------------------------------------------------
// DayLog
// ---------------------------------------------------------------------------

/// Fluent builder for one bouncer day file.
///
/// # Example
///
/// ```rust
/// let (name, body) = DayLog::new("2023-10-10")
///     .message("13:05:02", "alice", "hello")
///     .joined("13:05:03", "bob")
///     .raw("garbage")
///     .build();
/// ```
pub struct DayLog {
    name: String,
    lines: Vec<String>,
    crlf: bool,
}

impl DayLog {
    /// `date` is the file stem; `.log` is appended.
    pub fn new(date: &str) -> Self {
        Self::named(format!("{date}.log"))
    }

    /// Use an arbitrary file name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
            crlf: false,
        }
    }

    pub fn message(self, time: &str, nick: &str, text: &str) -> Self {
        self.raw(format!("[{time}] <{nick}> {text}"))
    }

    pub fn joined(self, time: &str, nick: &str) -> Self {
        self.raw(format!("[{time}] *** {nick} (~{nick}@host) joined"))
    }

    pub fn left(self, time: &str, nick: &str, reason: &str) -> Self {
        self.raw(format!("[{time}] *** {nick} (~{nick}@host) left ({reason})"))
    }

    pub fn quit(self, time: &str, nick: &str, reason: &str) -> Self {
        self.raw(format!("[{time}] *** Quits: {nick} (~{nick}@host) ({reason})"))
    }

    pub fn raw(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Terminate lines with `\r\n`.
    pub fn crlf(mut self) -> Self {
        self.crlf = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(self) -> (String, String) {
        let eol = if self.crlf { "\r\n" } else { "\n" };
        let mut body = String::new();
        for line in &self.lines {
            body.push_str(line);
            body.push_str(eol);
        }
        (self.name, body)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Collect day files into a [`MemorySource`].
pub fn memory_source(days: impl IntoIterator<Item = DayLog>) -> MemorySource {
    days.into_iter().fold(MemorySource::new(), |source, day| {
        let (name, body) = day.build();
        source.with_file(name, body)
    })
}

/// Write day files into a fresh temporary directory.
pub fn log_dir(days: impl IntoIterator<Item = DayLog>) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for day in days {
        write_day(dir.path(), day);
    }
    dir
}

pub fn write_day(dir: &Path, day: DayLog) {
    let (name, body) = day.build();
    std::fs::write(dir.join(&name), body).expect("write day file");
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

pub fn import_config() -> ImportConfig {
    ImportConfig::new(NETWORK, CHANNEL)
}

/// A best-effort, single-worker pipeline writing into a retaining
/// [`MemoryStore`].
pub fn memory_pipeline() -> IngestionPipeline<MemoryStore> {
    IngestionPipeline::new(import_config(), MemoryStore::new())
}

pub fn memory_pipeline_with(config: ImportConfig) -> IngestionPipeline<MemoryStore> {
    IngestionPipeline::new(config, MemoryStore::new())
}
