//! Project persistence.

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::project::{clean_name, Project};
use crate::error::WorktimeError;
use crate::storage::Database;

/// Project store over a shared database connection.
pub struct ProjectStorage<'a> {
    db: &'a Database,
}

/// Per-project counts used by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectCounts {
    pub sessions: usize,
    pub running: bool,
}

impl<'a> ProjectStorage<'a> {
    /// Create storage over an open database.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All projects ordered by name.
    pub fn list(&self) -> Result<Vec<Project>, WorktimeError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT id, name FROM projects ORDER BY name COLLATE NOCASE, id")
            .map_err(|e| WorktimeError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], row_to_project)
            .map_err(|e| WorktimeError::Database(format!("Failed to query projects: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| WorktimeError::Database(format!("Failed to read project: {e}")))
    }

    /// Session count and running flag for a project.
    pub fn counts(&self, id: i64) -> Result<ProjectCounts, WorktimeError> {
        let (sessions, running): (i64, i64) = self
            .db
            .connection()
            .query_row(
                r"SELECT COUNT(*),
                         COALESCE(SUM(CASE WHEN end_ms IS NULL THEN 1 ELSE 0 END), 0)
                  FROM sessions WHERE project_id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| WorktimeError::Database(format!("Failed to count sessions: {e}")))?;

        Ok(ProjectCounts {
            sessions: usize::try_from(sessions).unwrap_or(0),
            running: running > 0,
        })
    }

    /// A project by id.
    pub fn get(&self, id: i64) -> Result<Option<Project>, WorktimeError> {
        self.db
            .connection()
            .query_row("SELECT id, name FROM projects WHERE id = ?1", [id], row_to_project)
            .optional()
            .map_err(|e| WorktimeError::Database(format!("Failed to query project: {e}")))
    }

    /// The first project with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Project>, WorktimeError> {
        self.db
            .connection()
            .query_row(
                "SELECT id, name FROM projects WHERE name = ?1 ORDER BY id LIMIT 1",
                [name.trim()],
                row_to_project,
            )
            .optional()
            .map_err(|e| WorktimeError::Database(format!("Failed to query project: {e}")))
    }

    /// Look a project up by numeric id or exact name.
    ///
    /// A numeric reference that matches no id is tried as a name.
    pub fn resolve(&self, reference: &str) -> Result<Project, WorktimeError> {
        if let Ok(id) = reference.trim().parse::<i64>() {
            if let Some(project) = self.get(id)? {
                return Ok(project);
            }
        }

        self.find_by_name(reference)?
            .ok_or_else(|| WorktimeError::NotFound(format!("project '{}'", reference.trim())))
    }

    /// Create a project.
    pub fn create(&self, name: &str) -> Result<Project, WorktimeError> {
        let name = clean_name(name)
            .ok_or_else(|| WorktimeError::InvalidData("project name is empty".to_string()))?;

        let conn = self.db.connection();
        conn.execute("INSERT INTO projects (name) VALUES (?1)", [&name])
            .map_err(|e| WorktimeError::Database(format!("Failed to insert project: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(id, name = %name, "project created");
        Ok(Project { id, name })
    }

    /// Rename a project.
    pub fn rename(&self, id: i64, name: &str) -> Result<Project, WorktimeError> {
        let name = clean_name(name)
            .ok_or_else(|| WorktimeError::InvalidData("project name is empty".to_string()))?;

        let changed = self
            .db
            .connection()
            .execute("UPDATE projects SET name = ?1 WHERE id = ?2", params![name, id])
            .map_err(|e| WorktimeError::Database(format!("Failed to rename project: {e}")))?;

        if changed == 0 {
            return Err(WorktimeError::NotFound(format!("project {id}")));
        }
        debug!(id, name = %name, "project renamed");
        Ok(Project { id, name })
    }

    /// Delete a project and all its sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn delete(&self, id: i64) -> Result<usize, WorktimeError> {
        let tx = self.db.begin_immediate()?;

        let sessions = tx
            .execute("DELETE FROM sessions WHERE project_id = ?1", [id])
            .map_err(|e| WorktimeError::Database(format!("Failed to delete sessions: {e}")))?;
        let deleted = tx
            .execute("DELETE FROM projects WHERE id = ?1", [id])
            .map_err(|e| WorktimeError::Database(format!("Failed to delete project: {e}")))?;

        if deleted == 0 {
            return Err(WorktimeError::NotFound(format!("project {id}")));
        }

        tx.commit()
            .map_err(|e| WorktimeError::Database(format!("Failed to commit delete: {e}")))?;
        debug!(id, sessions, "project deleted");
        Ok(sessions)
    }
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
