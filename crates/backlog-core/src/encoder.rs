//! Event encoder — maps an [`Event`] to The Lounge's stored message object.
//!
//! Shapes written to the `msg` column:
//!
//! ```text
//! message          { from: { mode: "", nick }, self: false, text }
//! join/part/quit   { account: false, from: { mode: "", nick }, gecos: nick,
//!                    hostmask: "", self: false, text: <status line> }
//! ```
//!
//! Fields the bouncer log cannot supply are written explicitly as `""` or
//! `false`; The Lounge expects them to be present.

use crate::error::EncodeError;
use crate::types::{Event, EventKind};
use serde::{Deserialize, Serialize};

/// An encoded event: the `type` tag and the `msg` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedEvent {
    pub kind: EventKind,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Sender<'a> {
    mode: &'a str,
    nick: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    from: Sender<'a>,
    #[serde(rename = "self")]
    is_self: bool,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusPayload<'a> {
    account: bool,
    from: Sender<'a>,
    gecos: &'a str,
    hostmask: &'a str,
    #[serde(rename = "self")]
    is_self: bool,
    text: &'a str,
}

/// The fields every payload shape shares, used for decoding.
#[derive(Debug, Deserialize)]
struct StoredPayload {
    from: StoredFrom,
    text: String,
}

#[derive(Debug, Deserialize)]
struct StoredFrom {
    nick: String,
}

/// Encode an event into its destination payload.
pub fn encode(event: &Event) -> Result<EncodedEvent, EncodeError> {
    let nick = event.nick();
    if nick.is_empty() {
        return Err(EncodeError::EmptyNick);
    }
    let kind = event.kind();
    let from = Sender { mode: "", nick };
    let payload = match event {
        Event::Message { text, .. } => serde_json::to_value(MessagePayload {
            from,
            is_self: false,
            text,
        }),
        Event::Join { text, .. } | Event::Part { text, .. } | Event::Quit { text, .. } => {
            serde_json::to_value(StatusPayload {
                account: false,
                from,
                gecos: nick,
                hostmask: "",
                is_self: false,
                text,
            })
        }
    }
    .map_err(|source| EncodeError::Shape { kind, source })?;

    Ok(EncodedEvent { kind, payload })
}

/// Recover `(nick, text)` from a stored payload of the given kind.
pub fn decode_payload(
    kind: EventKind,
    payload: &serde_json::Value,
) -> Result<(String, String), EncodeError> {
    let stored = StoredPayload::deserialize(payload)
        .map_err(|source| EncodeError::Shape { kind, source })?;
    if stored.from.nick.is_empty() {
        return Err(EncodeError::EmptyNick);
    }
    Ok((stored.from.nick, stored.text))
}

/// Parse a stored `msg` column back into an [`Event`].
pub fn decode_event(kind: EventKind, payload: &serde_json::Value) -> Result<Event, EncodeError> {
    let (nick, text) = decode_payload(kind, payload)?;
    Ok(Event::status(kind, nick, text))
}
