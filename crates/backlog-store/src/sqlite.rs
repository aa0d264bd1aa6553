//! SQLite [`StoreWriter`] for The Lounge's `messages` table.

use backlog_core::error::StoreError;
use backlog_core::store::StoreWriter;
use backlog_core::types::NormalizedRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    network TEXT,
    channel TEXT,
    time    INTEGER,
    type    TEXT,
    msg     TEXT
);
CREATE INDEX IF NOT EXISTS network_channel ON messages (network, channel);
CREATE INDEX IF NOT EXISTS time ON messages (time);
"#;

const INSERT: &str =
    "INSERT INTO messages (network, channel, time, type, msg) VALUES (?1, ?2, ?3, ?4, ?5)";

/// How to open the database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteOptions {
    /// Create the `messages` table and its indexes if missing. Without this,
    /// a database lacking the table is reported as unavailable.
    pub create_schema: bool,
    /// How long to wait for a lock held by a running The Lounge instance.
    pub busy_timeout: Option<Duration>,
}

/// Appends records to a The Lounge SQLite database.
pub struct SqliteStore {
    conn: Connection,
    open_file: Option<String>,
    appended: usize,
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

impl SqliteStore {
    /// Open an existing database file.
    pub fn open(path: &Path, options: SqliteOptions) -> Result<Self, StoreError> {
        if !options.create_schema && !path.exists() {
            return Err(StoreError::Unavailable(format!(
                "database {} does not exist",
                path.display()
            )));
        }
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "opened message store");
        Self::from_connection(conn, options)
    }

    /// A throwaway in-memory database with the schema created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::from_connection(
            conn,
            SqliteOptions {
                create_schema: true,
                busy_timeout: None,
            },
        )
    }

    fn from_connection(conn: Connection, options: SqliteOptions) -> Result<Self, StoreError> {
        conn.busy_timeout(options.busy_timeout.unwrap_or(Duration::from_secs(5)))
            .map_err(backend)?;
        if options.create_schema {
            conn.execute_batch(SCHEMA).map_err(backend)?;
        } else if !has_messages_table(&conn)? {
            return Err(StoreError::Unavailable(
                "database has no messages table (is this a The Lounge database?)".into(),
            ));
        }
        Ok(Self {
            conn,
            open_file: None,
            appended: 0,
        })
    }

    /// Number of rows in `messages` for one destination.
    pub fn count_messages(&self, network: &str, channel: &str) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE network = ?1 AND channel = ?2",
                params![network, channel],
                |row| row.get(0),
            )
            .map_err(backend)?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Direct access for inspection in tests and tooling.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn has_messages_table(conn: &Connection) -> Result<bool, StoreError> {
    conn.query_row(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'messages'",
        [],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map(|name| name.is_some())
    .map_err(backend)
}

impl StoreWriter for SqliteStore {
    fn begin_file(&mut self, file: &str) -> Result<(), StoreError> {
        if self.open_file.is_some() {
            return Err(StoreError::Protocol("begin_file while a file is open"));
        }
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(backend)?;
        self.open_file = Some(file.to_string());
        self.appended = 0;
        Ok(())
    }

    fn append(&mut self, record: &NormalizedRecord) -> Result<(), StoreError> {
        if self.open_file.is_none() {
            return Err(StoreError::Protocol("append outside begin_file"));
        }
        let msg = serde_json::to_string(&record.payload)?;
        let mut stmt = self.conn.prepare_cached(INSERT).map_err(backend)?;
        stmt.execute(params![
            record.network_id,
            record.channel,
            record.timestamp_ms,
            record.kind.as_str(),
            msg,
        ])
        .map_err(|e| StoreError::Rejected(e.to_string()))?;
        self.appended += 1;
        Ok(())
    }

    fn commit_file(&mut self) -> Result<(), StoreError> {
        let file = self
            .open_file
            .take()
            .ok_or(StoreError::Protocol("commit_file without begin_file"))?;
        self.conn.execute_batch("COMMIT").map_err(backend)?;
        debug!(file = %file, rows = self.appended, "committed");
        Ok(())
    }

    fn rollback_file(&mut self) -> Result<(), StoreError> {
        let file = self
            .open_file
            .take()
            .ok_or(StoreError::Protocol("rollback_file without begin_file"))?;
        self.conn.execute_batch("ROLLBACK").map_err(backend)?;
        debug!(file = %file, rows = self.appended, "rolled back");
        Ok(())
    }
}
