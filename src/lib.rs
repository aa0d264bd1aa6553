//! backlog — import ZNC bouncer logs into The Lounge's message store.
//!
//! This crate wires the layers together and exposes them as public modules so
//! integration tests can import them directly.
//!
//! # Architecture
//!
//! ```text
//! LogSource ──► IngestionPipeline ──► StoreWriter
//!  (feeds)        │  parse · classify · timestamp · encode (core)
//!                 └──► IngestionReport
//! ```
//!
//! Files are independent: with `workers > 1` they are normalised in parallel
//! on a `rayon` pool, and the single store writer stays on the calling thread.

pub mod cancel;
pub mod error;
pub mod pipeline;

pub use backlog_core::{
    Config, Event, EventKind, FileDate, ImportConfig, ImportMode, IngestionReport,
    MemoryStore, NormalizedRecord, Position, RejectReason, Rejection, StoreError, StoreWriter,
    TimeZoneSpec,
};
pub use backlog_feeds::{DirectorySource, FeedError, LogFile, LogSource, MemorySource};
pub use backlog_store::{SqliteOptions, SqliteStore};
pub use cancel::CancelToken;
pub use error::PipelineError;
pub use pipeline::IngestionPipeline;
