//! `SQLite` database connection.
//!
//! The database lives at `~/.worktime/worktime.db` and holds the projects
//! and sessions tables.

use std::path::Path;

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use tracing::debug;

use crate::config::Paths;
use crate::error::WorktimeError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, WorktimeError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, WorktimeError> {
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path).map_err(|e| {
            WorktimeError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, WorktimeError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            WorktimeError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, WorktimeError> {
        // Cascading project deletes rely on this
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| WorktimeError::Database(format!("Failed to enable foreign keys: {e}")))?;

        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, WorktimeError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction that takes the database write lock up front.
    ///
    /// Concurrent writers block (or fail with `SQLITE_BUSY`) instead of
    /// interleaving check-then-insert sequences.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub fn begin_immediate(&self) -> Result<Transaction<'_>, WorktimeError> {
        Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(|e| WorktimeError::Database(format!("Failed to begin transaction: {e}")))
    }
}

/// Map a rusqlite error, turning constraint violations into conflicts.
pub(crate) fn map_write_error(context: &str, e: rusqlite::Error) -> WorktimeError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            WorktimeError::Conflict(format!("{context}: another session is already running"))
        }
        other => WorktimeError::Database(format!("{context}: {other}")),
    }
}
