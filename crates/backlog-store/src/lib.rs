//! backlog-store — The Lounge SQLite message store.
//!
//! The Lounge keeps channel history in a `messages` table:
//!
//! ```text
//! messages(network TEXT, channel TEXT, time INTEGER, type TEXT, msg TEXT)
//! ```
//!
//! [`SqliteStore`] appends one row per record and wraps each log file in its
//! own transaction.

pub mod sqlite;

pub use sqlite::{SqliteOptions, SqliteStore};
