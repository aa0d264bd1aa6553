//! Line parser — splits one bouncer log line into time, sender and body.
//!
//! The grammar is parsed in two explicit stages so each failure has a precise
//! reason:
//!
//! ```text
//! line   := "[" HH ":" MM ":" SS "] " sender? body
//! sender := "<" nick ">" (" " | EOL)
//! ```
//!
//! The timestamp stage is mandatory; a line that fails it is
//! [`RejectReason::NoTimestampPrefix`]. The sender stage is optional: a `<`
//! without a closing `>` simply means the line has no sender.
//!
//! A sender at end of line (`[12:00:00] <alice>`) is accepted as a message
//! with empty text rather than rejected, even though a stricter grammar
//! would require a space after `>`.

use crate::report::RejectReason;
use crate::types::ParsedLine;
use chrono::NaiveTime;

/// Length of `[HH:MM:SS] `.
const PREFIX_LEN: usize = 11;

/// A line the parser could not split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unparsed {
    pub reason: RejectReason,
}

impl std::fmt::Display for Unparsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unparsed line: {}", self.reason)
    }
}

impl std::error::Error for Unparsed {}

/// Parse one line of a bouncer log.
///
/// A trailing `\n` or `\r\n` is removed; every other byte of the body is kept
/// as-is, including leading and trailing whitespace.
pub fn parse_line(text: &str) -> Result<ParsedLine<'_>, Unparsed> {
    let line = strip_line_ending(text);
    let (time_of_day, rest) = split_timestamp(line).ok_or(Unparsed {
        reason: RejectReason::NoTimestampPrefix,
    })?;
    let (sender, body) = split_sender(rest);
    Ok(ParsedLine {
        time_of_day,
        sender,
        body,
    })
}

fn strip_line_ending(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

/// Stage one: `[HH:MM:SS] `. Returns the time and the remainder.
fn split_timestamp(line: &str) -> Option<(NaiveTime, &str)> {
    let b = line.as_bytes();
    if b.len() < PREFIX_LEN || b[0] != b'[' || b[3] != b':' || b[6] != b':' || &b[9..11] != b"] " {
        return None;
    }
    let hour = two_digits(b[1], b[2])?;
    let minute = two_digits(b[4], b[5])?;
    let second = two_digits(b[7], b[8])?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    // The first 11 bytes are ASCII, so this is a char boundary.
    Some((time, &line[PREFIX_LEN..]))
}

fn two_digits(tens: u8, ones: u8) -> Option<u32> {
    if tens.is_ascii_digit() && ones.is_ascii_digit() {
        Some(u32::from(tens - b'0') * 10 + u32::from(ones - b'0'))
    } else {
        None
    }
}

/// Stage two: optional `<nick>` followed by one space (or end of line).
fn split_sender(rest: &str) -> (Option<&str>, &str) {
    let Some(after_open) = rest.strip_prefix('<') else {
        return (None, rest);
    };
    let Some(close) = after_open.find('>') else {
        return (None, rest);
    };
    let nick = &after_open[..close];
    let tail = &after_open[close + 1..];
    if tail.is_empty() {
        return (Some(nick), tail);
    }
    match tail.strip_prefix(' ') {
        Some(body) => (Some(nick), body),
        // `<nick>text` without a separator is not a sender marker.
        None => (None, rest),
    }
}
