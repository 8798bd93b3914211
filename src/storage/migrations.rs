//! Schema migrations.
//!
//! The schema version lives in `PRAGMA user_version`. Each migration
//! upgrades the schema by one version and runs when the database is opened.

use rusqlite::Connection;
use tracing::debug;

use crate::error::WorktimeError;

/// Current schema version.
const CURRENT_VERSION: i32 = 2;

/// Read the schema version. A new database reports 0.
pub fn get_version(conn: &Connection) -> Result<i32, WorktimeError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| WorktimeError::Database(format!("Failed to get schema version: {e}")))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), WorktimeError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| WorktimeError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), WorktimeError> {
    let current = get_version(conn)?;

    for version in (current + 1)..=CURRENT_VERSION {
        debug!(version, "applying schema migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> Result<(), WorktimeError> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(WorktimeError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Projects and sessions.
///
/// Times are milliseconds since the Unix epoch. A `NULL` `end_ms` marks the
/// running session.
fn migrate_v1(conn: &Connection) -> Result<(), WorktimeError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            start_ms INTEGER NOT NULL,
            end_ms INTEGER,
            comment TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_project_start
        ON sessions(project_id, start_ms);
        ",
    )
    .map_err(|e| WorktimeError::Database(format!("Migration v1 failed: {e}")))
}

/// At most one running session in the whole store.
///
/// Every running row indexes the same value, so a second one violates the
/// unique constraint.
fn migrate_v2(conn: &Connection) -> Result<(), WorktimeError> {
    conn.execute_batch(
        r"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_single_running
        ON sessions((end_ms IS NULL))
        WHERE end_ms IS NULL;
        ",
    )
    .map_err(|e| WorktimeError::Database(format!("Migration v2 failed: {e}")))
}
