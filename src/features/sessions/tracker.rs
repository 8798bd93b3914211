//! Start/stop state machine.
//!
//! A project moves from not started to running on `start` and from running
//! to closed on `stop`. Only one session may run at a time across all
//! projects.

use chrono::{DateTime, Utc};
use tracing::info;

use super::repository::SessionRepository;
use super::session::{NewSession, Session, SessionUpdate};
use crate::error::WorktimeError;

/// Drives session transitions through a repository.
pub struct Tracker<'a, R: SessionRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: SessionRepository + ?Sized> Tracker<'a, R> {
    /// Create a tracker over a repository.
    #[must_use]
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Start a session for `project_id` at `at`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if any session is already running.
    pub fn start(
        &self,
        project_id: i64,
        at: DateTime<Utc>,
        comment: Option<String>,
    ) -> Result<Session, WorktimeError> {
        if let Some(open) = self.repo.open_session()? {
            return Err(WorktimeError::Conflict(format!(
                "session {} for project {} is already running; stop it first",
                open.id, open.project_id
            )));
        }

        let id = self
            .repo
            .create_session(NewSession::running(project_id, at).with_comment(comment))?;
        info!(session = id, project = project_id, "session started");

        self.reload(id)
    }

    /// Stop the running session at `at`.
    ///
    /// The end is clamped so it is never before the start. A comment replaces
    /// the session's existing one.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session is running.
    pub fn stop(&self, at: DateTime<Utc>, comment: Option<String>) -> Result<Session, WorktimeError> {
        let open = self
            .repo
            .open_session()?
            .ok_or_else(|| WorktimeError::NotFound("no session is running".to_string()))?;

        let mut update = SessionUpdate::close_at(at.max(open.start));
        if comment.is_some() {
            update.comment = Some(comment);
        }
        self.repo.update_session(open.id, update)?;
        info!(session = open.id, project = open.project_id, "session stopped");

        self.reload(open.id)
    }

    /// The running session, if any.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn status(&self) -> Result<Option<Session>, WorktimeError> {
        self.repo.open_session()
    }

    fn reload(&self, id: i64) -> Result<Session, WorktimeError> {
        self.repo
            .session(id)?
            .ok_or_else(|| WorktimeError::NotFound(format!("session {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sessions::{MockSessionRepository, SessionStorage};
    use crate::storage::Database;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, 0, 0).unwrap()
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch("INSERT INTO projects (name) VALUES ('Acme'), ('Side');")
            .unwrap();
        db
    }

    #[test]
    fn test_start_stop_cycle() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let tracker = Tracker::new(&storage);

        assert!(tracker.status().unwrap().is_none());

        let started = tracker.start(1, at(9), None).unwrap();
        assert!(started.is_running());
        assert_eq!(tracker.status().unwrap().unwrap().id, started.id);

        let stopped = tracker.stop(at(17), Some("done".to_string())).unwrap();
        assert_eq!(stopped.id, started.id);
        assert_eq!(stopped.end, Some(at(17)));
        assert_eq!(stopped.comment.as_deref(), Some("done"));
        assert!(tracker.status().unwrap().is_none());
    }

    #[test]
    fn test_start_while_running_conflicts() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let tracker = Tracker::new(&storage);

        tracker.start(1, at(9), None).unwrap();
        let err = tracker.start(2, at(10), None).unwrap_err();
        assert!(matches!(err, WorktimeError::Conflict(_)));
    }

    #[test]
    fn test_stop_without_running_is_not_found() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let tracker = Tracker::new(&storage);

        let err = tracker.stop(at(9), None).unwrap_err();
        assert!(matches!(err, WorktimeError::NotFound(_)));
    }

    #[test]
    fn test_stop_keeps_comment_when_none_given() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let tracker = Tracker::new(&storage);

        tracker.start(1, at(9), Some("planning".to_string())).unwrap();
        let stopped = tracker.stop(at(8), None).unwrap();
        assert_eq!(stopped.comment.as_deref(), Some("planning"));
        // Clamped to the start
        assert_eq!(stopped.end, Some(at(9)));
    }

    #[test]
    fn test_repository_errors_propagate() {
        let mut repo = MockSessionRepository::new();
        repo.expect_open_session()
            .returning(|| Err(WorktimeError::Database("disk I/O error".to_string())));

        let tracker = Tracker::new(&repo);
        let err = tracker.start(1, at(9), None).unwrap_err();
        assert!(matches!(err, WorktimeError::Database(_)));
    }
}
