//! Core types for backlog-core.
//!
//! This module defines the data structures shared across every layer of the
//! import: the [`RawLogLine`] read from disk, the [`ParsedLine`] produced by the
//! parser, the classified [`Event`], and the [`NormalizedRecord`] handed to the
//! store. Every value here is created and dropped within the processing of a
//! single line or file.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One line as read from a bouncer log file (UTF-8 lossy converted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogLine {
    /// File name the line came from (e.g. `2023-10-10.log`).
    pub source_file: String,
    /// Calendar date encoded in the file name.
    pub file_date: NaiveDate,
    /// 1-based line number within the file.
    pub line_number: usize,
    /// Line text without its line terminator.
    pub text: String,
}

/// A line split into its timestamp, optional sender and body.
///
/// Borrows from the raw text; the classifier copies out only what it keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub time_of_day: NaiveTime,
    /// Sender nick with the angle brackets already removed. `None` when the
    /// line carries no `<nick>` marker.
    pub sender: Option<&'a str>,
    /// Everything after the timestamp (and sender), whitespace preserved.
    pub body: &'a str,
}

/// The semantic kind of a classified line. Doubles as the `type` column of
/// The Lounge `messages` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Join,
    Part,
    Quit,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Message,
        EventKind::Join,
        EventKind::Part,
        EventKind::Quit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::Quit => "quit",
        }
    }

    /// Whether this kind is rendered from a `***` status line.
    pub fn is_status(self) -> bool {
        !matches!(self, EventKind::Message)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(EventKind::Message),
            "join" => Ok(EventKind::Join),
            "part" => Ok(EventKind::Part),
            "quit" => Ok(EventKind::Quit),
            other => Err(format!("unknown event kind {other:?}")),
        }
    }
}

/// A classified log line.
///
/// Every variant carries a non-empty `nick`. Status variants carry the full
/// status line as `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Message { nick: String, text: String },
    Join { nick: String, text: String },
    Part { nick: String, text: String },
    Quit { nick: String, text: String },
}

impl Event {
    /// Build a status event of the given kind. A `Message` kind yields a
    /// message event, which keeps this total.
    pub fn status(kind: EventKind, nick: impl Into<String>, text: impl Into<String>) -> Self {
        let (nick, text) = (nick.into(), text.into());
        match kind {
            EventKind::Message => Event::Message { nick, text },
            EventKind::Join => Event::Join { nick, text },
            EventKind::Part => Event::Part { nick, text },
            EventKind::Quit => Event::Quit { nick, text },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Message { .. } => EventKind::Message,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Quit { .. } => EventKind::Quit,
        }
    }

    pub fn nick(&self) -> &str {
        match self {
            Event::Message { nick, .. }
            | Event::Join { nick, .. }
            | Event::Part { nick, .. }
            | Event::Quit { nick, .. } => nick,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Event::Message { text, .. }
            | Event::Join { text, .. }
            | Event::Part { text, .. }
            | Event::Quit { text, .. } => text,
        }
    }
}

/// The unit handed to a [`StoreWriter`](crate::store::StoreWriter): one row of
/// the destination `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub network_id: String,
    pub channel: String,
    /// Absolute instant, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub kind: EventKind,
    /// Serialized message object in The Lounge's shape.
    pub payload: serde_json::Value,
}
