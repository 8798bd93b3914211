//! Moving backups in and out of the database.

use rusqlite::params;
use serde::Serialize;
use tracing::info;

use super::document::{BackupDocument, BackupProject, BackupSession};
use crate::error::WorktimeError;
use crate::features::projects::ProjectStorage;
use crate::features::sessions::{SessionQuery, SessionRepository, SessionStorage};
use crate::storage::{map_write_error, Database};

/// What an export or import touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub projects: usize,
    pub sessions: usize,
}

/// Snapshot every project (by name) and its sessions (by start).
///
/// # Errors
///
/// Propagates database errors.
pub fn collect(db: &Database) -> Result<BackupDocument, WorktimeError> {
    let sessions = SessionStorage::new(db);
    let mut document = BackupDocument::default();

    for project in ProjectStorage::new(db).list()? {
        let project_sessions = sessions
            .sessions(&SessionQuery::for_project(project.id))?
            .into_iter()
            .map(|s| BackupSession {
                id: s.id,
                start_ms: s.start.timestamp_millis(),
                end_ms: s.end.map(|t| t.timestamp_millis()),
                comment: s.comment,
            })
            .collect();

        document.projects.push(BackupProject {
            id: project.id,
            name: project.name,
            sessions: project_sessions,
        });
    }

    Ok(document)
}

/// Add every project and session of `document` to the database.
///
/// Projects get fresh ids. Everything happens in one transaction, so on
/// error the database is unchanged.
///
/// # Errors
///
/// Returns `Conflict` if the backup holds a running session while one is
/// already running (or holds two), and `Backup` for sessions that end
/// before they start.
pub fn restore(db: &Database, document: &BackupDocument) -> Result<BackupSummary, WorktimeError> {
    let tx = db.begin_immediate()?;
    let mut summary = BackupSummary {
        projects: 0,
        sessions: 0,
    };

    for project in &document.projects {
        tx.execute("INSERT INTO projects (name) VALUES (?1)", [&project.name])
            .map_err(|e| WorktimeError::Database(format!("Failed to import project: {e}")))?;
        let project_id = tx.last_insert_rowid();
        summary.projects += 1;

        for session in &project.sessions {
            if session.end_ms.is_some_and(|end| end < session.start_ms) {
                return Err(WorktimeError::Backup(format!(
                    "session {} of project '{}' ends before it starts",
                    session.id, project.name
                )));
            }

            tx.execute(
                "INSERT INTO sessions (project_id, start_ms, end_ms, comment) VALUES (?1, ?2, ?3, ?4)",
                params![project_id, session.start_ms, session.end_ms, session.comment],
            )
            .map_err(|e| map_write_error("Failed to import session", e))?;
            summary.sessions += 1;
        }
    }

    tx.commit()
        .map_err(|e| WorktimeError::Database(format!("Failed to commit import: {e}")))?;

    info!(projects = summary.projects, sessions = summary.sessions, "backup imported");
    Ok(summary)
}
