//! Event classifier — decides what a parsed line means.
//!
//! Precedence:
//!
//! 1. A body starting with `***` is a status line. It is a join when the body
//!    contains `joined`, a part when it contains `left`, and a quit otherwise
//!    (disconnects, kicks, nick changes all land here). The subject nick is
//!    the second whitespace-separated token with surrounding parentheses
//!    removed.
//! 2. Anything else is a chat message and must carry a sender.
//!
//! A line that cannot yield a non-empty nick is rejected, never defaulted.

use crate::report::RejectReason;
use crate::types::{Event, EventKind, ParsedLine};

/// Prefix that marks a membership/status line.
pub const STATUS_MARKER: &str = "***";

/// Classify a parsed line into an [`Event`].
pub fn classify(parsed: &ParsedLine<'_>) -> Result<Event, RejectReason> {
    if parsed.body.starts_with(STATUS_MARKER) {
        return classify_status(parsed.body);
    }

    match parsed.sender {
        Some(nick) if !nick.trim().is_empty() => Ok(Event::Message {
            nick: nick.to_string(),
            text: parsed.body.to_string(),
        }),
        _ => Err(RejectReason::MissingSender),
    }
}

/// Kind of a status line, by keyword.
pub fn status_kind(body: &str) -> EventKind {
    if body.contains("joined") {
        EventKind::Join
    } else if body.contains("left") {
        EventKind::Part
    } else {
        EventKind::Quit
    }
}

fn classify_status(body: &str) -> Result<Event, RejectReason> {
    let subject = body
        .split_whitespace()
        .nth(1)
        .ok_or(RejectReason::MalformedStatusLine)?;
    let nick = subject.trim_matches(|c| c == '(' || c == ')');
    if nick.is_empty() {
        return Err(RejectReason::MalformedStatusLine);
    }
    Ok(Event::status(status_kind(body), nick, body))
}
