//! Error types for backlog-core.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort configuration or a run. Per-line problems are not errors;
/// they are [`Rejection`](crate::report::Rejection)s in the report.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read or deserialized.
    #[error("configuration error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// Configuration loaded but is not usable (missing network, bad mode...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Time zone is not `UTC` or a fixed `±HH:MM` offset.
    #[error("invalid time zone {0:?}: expected UTC or a fixed offset such as +02:00")]
    TimeZone(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by a [`StoreWriter`](crate::store::StoreWriter).
///
/// Any of these aborts the run: retrying blindly could insert duplicates.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store cannot be reached or is not set up for writing.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write.
    #[error("store rejected write: {0}")]
    Rejected(String),

    /// Transaction calls out of order (e.g. `append` outside `begin_file`).
    #[error("store protocol error: {0}")]
    Protocol(&'static str),

    /// Payload could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from [`encode`](crate::encoder::encode) and
/// [`decode_payload`](crate::encoder::decode_payload).
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("event has an empty nick")]
    EmptyNick,

    #[error("payload does not match the {kind} shape: {source}")]
    Shape {
        kind: crate::types::EventKind,
        #[source]
        source: serde_json::Error,
    },
}
