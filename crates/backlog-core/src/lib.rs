//! backlog-core — line-processing layers for importing bouncer logs.
//!
//! This crate exposes each stage of the per-line pipeline as a public module,
//! plus the shared types and the store abstraction.
//!
//! # Architecture
//!
//! ```text
//! text ──► parser ──► classifier ──► timestamp ──► encoder ──► StoreWriter
//!            │            │                           │
//!            └────────────┴──────► report ◄───────────┘
//! ```
//!
//! Every stage is a pure function; only the [`store::StoreWriter`] performs
//! I/O. File discovery and reading live in `backlog-feeds`, orchestration in
//! the `backlog` crate.

pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod store;
pub mod timestamp;
pub mod types;

pub use config::{Config, ImportConfig, ImportMode};
pub use error::{EncodeError, Error, Result, StoreError};
pub use normalizer::{Normalized, Normalizer};
pub use report::{IngestionReport, Position, RejectReason, Rejection};
pub use store::{MemoryStore, StoreWriter};
pub use timestamp::{FileDate, TimeZoneSpec, TimestampNormalizer};
pub use types::{Event, EventKind, NormalizedRecord, ParsedLine, RawLogLine};
