//! Normalizer — turns one raw log line into a [`NormalizedRecord`].
//!
//! Runs the per-line stages in order:
//! [`parse_line`] → [`classify`] → [`TimestampNormalizer`] → [`encode`].
//! Any stage may reject the line; the first rejection wins.

use crate::classifier::classify;
use crate::encoder::encode;
use crate::error::EncodeError;
use crate::parser::parse_line;
use crate::report::RejectReason;
use crate::timestamp::{FileDate, TimestampNormalizer};
use crate::types::{Event, NormalizedRecord, RawLogLine};

/// Destination and zone shared by every line of a run.
#[derive(Debug, Clone)]
pub struct Normalizer {
    network_id: String,
    channel: String,
    timestamps: TimestampNormalizer,
}

/// A successfully normalized line, with the event it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub event: Event,
    pub record: NormalizedRecord,
}

impl Normalizer {
    pub fn new(
        network_id: impl Into<String>,
        channel: impl Into<String>,
        timestamps: TimestampNormalizer,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            channel: channel.into(),
            timestamps,
        }
    }

    pub fn timestamps(&self) -> &TimestampNormalizer {
        &self.timestamps
    }

    /// Normalize a line read from a day file.
    pub fn normalize_raw(&self, raw: &RawLogLine) -> Result<Normalized, RejectReason> {
        self.normalize(FileDate(raw.file_date), &raw.text)
    }

    /// Normalize one line of a file dated `date`.
    pub fn normalize(&self, date: FileDate, text: &str) -> Result<Normalized, RejectReason> {
        let parsed = parse_line(text).map_err(|u| u.reason)?;
        let event = classify(&parsed)?;
        let timestamp_ms = self.timestamps.timestamp_ms(date, parsed.time_of_day);
        let encoded = encode(&event).map_err(|e| match e {
            EncodeError::EmptyNick => RejectReason::EmptyNick,
            EncodeError::Shape { .. } => RejectReason::InvalidPayload,
        })?;
        let record = NormalizedRecord {
            network_id: self.network_id.clone(),
            channel: self.channel.clone(),
            timestamp_ms,
            kind: encoded.kind,
            payload: encoded.payload,
        };
        Ok(Normalized { event, record })
    }
}
