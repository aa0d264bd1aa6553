//! Timestamp normalizer — anchors a line's time of day to its file's date.
//!
//! Bouncer logs only carry `HH:MM:SS`; the calendar date comes from the file
//! name (`2023-10-10.log`). The combined wall-clock time is interpreted in one
//! explicitly configured [`TimeZoneSpec`], never the host's local zone, so the
//! same files always produce the same instants.
//!
//! The zone is a fixed UTC offset. Daylight-saving transitions are not
//! modelled: a log recorded in a DST-observing zone will be off by the DST
//! delta for part of the year.

use crate::error::Error;
use crate::report::RejectReason;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Calendar date derived from a log file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileDate(pub NaiveDate);

impl FileDate {
    /// Parse the `YYYY-MM-DD` stem of a file name. Any extension is ignored.
    ///
    /// Only the zero-padded 10-character form is accepted, so that the lexical
    /// order files are imported in is also their chronological order.
    pub fn from_file_name(name: &str) -> Result<Self, RejectReason> {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(RejectReason::UnparseableFileDate)?;
        // `%Y-%m-%d` alone would also take `2023-1-5`.
        if stem.len() != 10 {
            return Err(RejectReason::UnparseableFileDate);
        }
        NaiveDate::parse_from_str(stem, "%Y-%m-%d")
            .map(FileDate)
            .map_err(|_| RejectReason::UnparseableFileDate)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for FileDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A named fixed time zone: `UTC`, `Z`, or an offset such as `+02:00`,
/// `-0530`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeZoneSpec(FixedOffset);

impl TimeZoneSpec {
    pub fn utc() -> Self {
        TimeZoneSpec(Utc.fix())
    }

    pub fn offset(self) -> FixedOffset {
        self.0
    }
}

impl Default for TimeZoneSpec {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for TimeZoneSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::utc());
        }
        // `±HH:MM` or `±HHMM`; out-of-range hours or minutes are refused.
        trimmed
            .parse::<FixedOffset>()
            .map(TimeZoneSpec)
            .map_err(|_| Error::TimeZone(s.to_string()))
    }
}

impl TryFrom<String> for TimeZoneSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeZoneSpec> for String {
    fn from(tz: TimeZoneSpec) -> Self {
        tz.to_string()
    }
}

impl fmt::Display for TimeZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.local_minus_utc() == 0 {
            f.write_str("UTC")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Converts `(file date, time of day)` into epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampNormalizer {
    zone: TimeZoneSpec,
}

impl TimestampNormalizer {
    pub fn new(zone: TimeZoneSpec) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> TimeZoneSpec {
        self.zone
    }

    /// Milliseconds since the Unix epoch of `date time` in the configured zone.
    pub fn timestamp_ms(&self, date: FileDate, time: NaiveTime) -> i64 {
        let local = date.0.and_time(time);
        let utc = local - TimeDelta::seconds(i64::from(self.zone.0.local_minus_utc()));
        utc.and_utc().timestamp_millis()
    }
}
