//! Domain-specific assertion macros for backlog harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which line or file of an import went wrong.

// ---------------------------------------------------------------------------
// Report assertions
// ---------------------------------------------------------------------------

/// Assert that the report rejected `line` of `file` for `reason`.
///
/// ```rust
/// assert_rejected!(report, "2023-10-10.log", 2, RejectReason::NoTimestampPrefix);
/// ```
#[macro_export]
macro_rules! assert_rejected {
    ($report:expr, $file:expr, $line:expr, $reason:expr) => {{
        let report: &backlog::IngestionReport = &$report;
        let file: &str = $file;
        let line: usize = $line;
        let reason: backlog::RejectReason = $reason;
        let found = report
            .rejections
            .iter()
            .any(|r| r.file == file && r.line == Some(line) && r.reason == reason);
        if !found {
            panic!(
                "assert_rejected! failed: no rejection {}:{} ({})\n  rejections: {:#?}",
                file, line, reason, report.rejections
            );
        }
    }};
}

/// Assert that `file` was rejected as a whole for `reason`.
#[macro_export]
macro_rules! assert_file_rejected {
    ($report:expr, $file:expr, $reason:expr) => {{
        let report: &backlog::IngestionReport = &$report;
        let file: &str = $file;
        let reason: backlog::RejectReason = $reason;
        let found = report
            .rejections
            .iter()
            .any(|r| r.file == file && r.line.is_none() && r.reason == reason);
        if !found {
            panic!(
                "assert_file_rejected! failed: {} not rejected for {}\n  rejections: {:#?}",
                file, reason, report.rejections
            );
        }
    }};
}

/// Assert that the report shows `n` records of `kind` written.
#[macro_export]
macro_rules! assert_written {
    ($report:expr, $kind:expr, $n:expr) => {{
        let report: &backlog::IngestionReport = &$report;
        let kind: backlog::EventKind = $kind;
        let expected: usize = $n;
        let actual = report.written.get(kind);
        if actual != expected {
            panic!(
                "assert_written! failed for {}:\n  expected: {}\n  actual:   {}\n  report:\n{}",
                kind, expected, actual, report
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Record assertions
// ---------------------------------------------------------------------------

/// Assert a record's kind and the nick inside its payload.
///
/// ```rust
/// assert_record!(store.records()[0], EventKind::Join, "bob");
/// ```
#[macro_export]
macro_rules! assert_record {
    ($record:expr, $kind:expr, $nick:expr) => {{
        let record: &backlog::NormalizedRecord = &$record;
        let kind: backlog::EventKind = $kind;
        let nick: &str = $nick;
        if record.kind != kind || record.payload["from"]["nick"] != nick {
            panic!(
                "assert_record! failed:\n  expected: {} from {:?}\n  actual:   {} {}",
                kind, nick, record.kind, record.payload
            );
        }
    }};
}

/// Assert that records are in non-decreasing timestamp order.
#[macro_export]
macro_rules! assert_chronological {
    ($records:expr) => {{
        let records: &[backlog::NormalizedRecord] = &$records;
        for pair in records.windows(2) {
            if pair[1].timestamp_ms < pair[0].timestamp_ms {
                panic!(
                    "assert_chronological! failed:\n  {} came after {}\n  {}\n  {}",
                    pair[1].timestamp_ms, pair[0].timestamp_ms, pair[0].payload, pair[1].payload
                );
            }
        }
    }};
}
