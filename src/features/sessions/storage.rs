//! `SQLite`-backed session store.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::repository::SessionRepository;
use super::session::{NewSession, Session, SessionQuery, SessionUpdate};
use crate::error::WorktimeError;
use crate::storage::{map_write_error, Database};

const SESSION_COLUMNS: &str = "id, project_id, start_ms, end_ms, comment";

/// Session store over a shared database connection.
pub struct SessionStorage<'a> {
    db: &'a Database,
}

impl<'a> SessionStorage<'a> {
    /// Create storage over an open database.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl SessionRepository for SessionStorage<'_> {
    fn open_session(&self) -> Result<Option<Session>, WorktimeError> {
        query_open(self.db.connection())
    }

    fn sessions(&self, query: &SessionQuery) -> Result<Vec<Session>, WorktimeError> {
        let mut sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE 1 = 1");
        let mut values: Vec<i64> = Vec::new();

        if let Some(project_id) = query.project_id {
            values.push(project_id);
            sql.push_str(&format!(" AND project_id = ?{}", values.len()));
        }
        if let Some(from) = query.from {
            values.push(from.timestamp_millis());
            sql.push_str(&format!(" AND start_ms >= ?{}", values.len()));
        }
        if let Some(to) = query.to {
            values.push(to.timestamp_millis());
            sql.push_str(&format!(" AND start_ms < ?{}", values.len()));
        }
        if query.closed_only {
            sql.push_str(" AND end_ms IS NOT NULL");
        }
        let order = query.order.as_sql();
        sql.push_str(&format!(" ORDER BY start_ms {order}, id {order}"));
        if let Some(limit) = query.limit {
            values.push(i64::try_from(limit).unwrap_or(i64::MAX));
            sql.push_str(&format!(" LIMIT ?{}", values.len()));
        }

        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| WorktimeError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params_from_iter(values.iter()), row_to_session)
            .map_err(|e| WorktimeError::Database(format!("Failed to query sessions: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| WorktimeError::Database(format!("Failed to read session: {e}")))
    }

    fn session(&self, id: i64) -> Result<Option<Session>, WorktimeError> {
        query_one(self.db.connection(), id)
    }

    fn create_session(&self, new: NewSession) -> Result<i64, WorktimeError> {
        check_order(new.start, new.end)?;

        let tx = self.db.begin_immediate()?;
        ensure_project(&tx, new.project_id)?;

        if new.end.is_none() {
            if let Some(open) = query_open(&tx)? {
                return Err(WorktimeError::Conflict(format!(
                    "session {} is already running",
                    open.id
                )));
            }
        }

        // Insert only if no session is open, or the new one is closed
        let inserted = tx
            .execute(
                r"INSERT INTO sessions (project_id, start_ms, end_ms, comment)
                  SELECT ?1, ?2, ?3, ?4
                  WHERE ?3 IS NOT NULL
                     OR NOT EXISTS (SELECT 1 FROM sessions WHERE end_ms IS NULL)",
                params![
                    new.project_id,
                    new.start.timestamp_millis(),
                    new.end.map(|t| t.timestamp_millis()),
                    new.comment,
                ],
            )
            .map_err(|e| map_write_error("Failed to insert session", e))?;

        if inserted == 0 {
            return Err(WorktimeError::Conflict(
                "another session is already running".to_string(),
            ));
        }

        let id = tx.last_insert_rowid();
        tx.commit()
            .map_err(|e| WorktimeError::Database(format!("Failed to commit session: {e}")))?;

        debug!(id, project_id = new.project_id, running = new.end.is_none(), "session created");
        Ok(id)
    }

    fn update_session(&self, id: i64, update: SessionUpdate) -> Result<(), WorktimeError> {
        let tx = self.db.begin_immediate()?;

        let mut session = query_one(&tx, id)?
            .ok_or_else(|| WorktimeError::NotFound(format!("session {id}")))?;
        let was_running = session.is_running();
        update.apply(&mut session);
        check_order(session.start, session.end)?;

        if update.project_id.is_some() {
            ensure_project(&tx, session.project_id)?;
        }
        if session.is_running() && !was_running {
            if let Some(open) = query_open(&tx)? {
                return Err(WorktimeError::Conflict(format!(
                    "session {} is already running",
                    open.id
                )));
            }
        }

        tx.execute(
            r"UPDATE sessions SET
              project_id = ?1,
              start_ms = ?2,
              end_ms = ?3,
              comment = ?4
              WHERE id = ?5",
            params![
                session.project_id,
                session.start.timestamp_millis(),
                session.end.map(|t| t.timestamp_millis()),
                session.comment,
                id,
            ],
        )
        .map_err(|e| map_write_error("Failed to update session", e))?;

        tx.commit()
            .map_err(|e| WorktimeError::Database(format!("Failed to commit session: {e}")))?;

        debug!(id, "session updated");
        Ok(())
    }

    fn delete_session(&self, id: i64) -> Result<bool, WorktimeError> {
        let deleted = self
            .db
            .connection()
            .execute("DELETE FROM sessions WHERE id = ?1", [id])
            .map_err(|e| WorktimeError::Database(format!("Failed to delete session: {e}")))?;

        debug!(id, deleted = deleted > 0, "session deleted");
        Ok(deleted > 0)
    }
}

fn check_order(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), WorktimeError> {
    match end {
        Some(end) if end < start => Err(WorktimeError::InvalidData(format!(
            "session ends ({end}) before it starts ({start})"
        ))),
        _ => Ok(()),
    }
}

fn ensure_project(conn: &Connection, project_id: i64) -> Result<(), WorktimeError> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM projects WHERE id = ?1)",
            [project_id],
            |row| row.get(0),
        )
        .map_err(|e| WorktimeError::Database(format!("Failed to look up project: {e}")))?;

    if exists {
        Ok(())
    } else {
        Err(WorktimeError::NotFound(format!("project {project_id}")))
    }
}

fn query_open(conn: &Connection) -> Result<Option<Session>, WorktimeError> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE end_ms IS NULL LIMIT 1"),
        [],
        row_to_session,
    )
    .optional()
    .map_err(|e| WorktimeError::Database(format!("Failed to query running session: {e}")))
}

fn query_one(conn: &Connection, id: i64) -> Result<Option<Session>, WorktimeError> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
        [id],
        row_to_session,
    )
    .optional()
    .map_err(|e| WorktimeError::Database(format!("Failed to query session: {e}")))
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    let start_ms: i64 = row.get(2)?;
    let end_ms: Option<i64> = row.get(3)?;

    Ok(Session {
        id: row.get(0)?,
        project_id: row.get(1)?,
        start: from_millis(start_ms, 2)?,
        end: end_ms.map(|ms| from_millis(ms, 3)).transpose()?,
        comment: row.get(4)?,
    })
}

fn from_millis(ms: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sessions::SortOrder;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch("INSERT INTO projects (name) VALUES ('Acme'), ('Side');")
            .unwrap();
        db
    }

    #[test]
    fn test_create_and_get() {
        let db = setup();
        let storage = SessionStorage::new(&db);

        let id = storage
            .create_session(
                NewSession::closed(1, at(4, 9), at(4, 17)).with_comment(Some("setup".into())),
            )
            .unwrap();
        let session = storage.session(id).unwrap().unwrap();

        assert_eq!(session.project_id, 1);
        assert_eq!(session.start, at(4, 9));
        assert_eq!(session.end, Some(at(4, 17)));
        assert_eq!(session.comment.as_deref(), Some("setup"));
        assert!(storage.session(999).unwrap().is_none());
    }

    #[test]
    fn test_second_running_session_conflicts() {
        let db = setup();
        let storage = SessionStorage::new(&db);

        storage.create_session(NewSession::running(1, at(4, 9))).unwrap();
        let err = storage
            .create_session(NewSession::running(2, at(4, 10)))
            .unwrap_err();
        assert!(matches!(err, WorktimeError::Conflict(_)));

        // Closed sessions can still be added
        storage
            .create_session(NewSession::closed(2, at(3, 9), at(3, 10)))
            .unwrap();
        let all = storage.sessions(&SessionQuery::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_open_session() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        assert!(storage.open_session().unwrap().is_none());

        let id = storage.create_session(NewSession::running(1, at(4, 9))).unwrap();
        assert_eq!(storage.open_session().unwrap().unwrap().id, id);

        storage
            .update_session(id, SessionUpdate::close_at(at(4, 12)))
            .unwrap();
        assert!(storage.open_session().unwrap().is_none());
    }

    #[test]
    fn test_unknown_project_is_not_found() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let err = storage
            .create_session(NewSession::running(42, at(4, 9)))
            .unwrap_err();
        assert!(matches!(err, WorktimeError::NotFound(_)));
    }

    #[test]
    fn test_end_before_start_is_invalid() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let err = storage
            .create_session(NewSession::closed(1, at(4, 12), at(4, 9)))
            .unwrap_err();
        assert!(matches!(err, WorktimeError::InvalidData(_)));
    }

    #[test]
    fn test_reopen_conflicts_with_running() {
        let db = setup();
        let storage = SessionStorage::new(&db);

        let closed = storage
            .create_session(NewSession::closed(1, at(3, 9), at(3, 10)))
            .unwrap();
        storage.create_session(NewSession::running(1, at(4, 9))).unwrap();

        let reopen = SessionUpdate {
            end: Some(None),
            ..SessionUpdate::default()
        };
        let err = storage.update_session(closed, reopen).unwrap_err();
        assert!(matches!(err, WorktimeError::Conflict(_)));
        assert!(storage.session(closed).unwrap().unwrap().end.is_some());
    }

    #[test]
    fn test_update_missing_session() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let err = storage
            .update_session(5, SessionUpdate::close_at(at(4, 9)))
            .unwrap_err();
        assert!(matches!(err, WorktimeError::NotFound(_)));
    }

    #[test]
    fn test_query_filters_and_order() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        for day in 1..=5 {
            storage
                .create_session(NewSession::closed(1, at(day, 9), at(day, 10)))
                .unwrap();
        }
        storage
            .create_session(NewSession::closed(2, at(3, 11), at(3, 12)))
            .unwrap();
        storage.create_session(NewSession::running(1, at(6, 9))).unwrap();

        let ranged = storage
            .sessions(
                &SessionQuery::for_project(1)
                    .between(Some(at(2, 0)), Some(at(4, 9)))
                    .order(SortOrder::Descending),
            )
            .unwrap();
        let starts: Vec<_> = ranged.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(3, 9), at(2, 9)]);

        let closed = storage
            .sessions(&SessionQuery::for_project(1).closed())
            .unwrap();
        assert_eq!(closed.len(), 5);
        assert!(closed.windows(2).all(|w| w[0].start <= w[1].start));

        let limited = storage
            .sessions(&SessionQuery::for_project(1).limit(Some(2)))
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_delete() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let id = storage
            .create_session(NewSession::closed(1, at(4, 9), at(4, 10)))
            .unwrap();

        assert!(storage.delete_session(id).unwrap());
        assert!(!storage.delete_session(id).unwrap());
    }

    #[test]
    fn test_millisecond_precision_survives() {
        let db = setup();
        let storage = SessionStorage::new(&db);
        let start = Utc.timestamp_millis_opt(1_709_542_800_123).unwrap();
        let id = storage.create_session(NewSession::running(1, start)).unwrap();
        assert_eq!(storage.session(id).unwrap().unwrap().start, start);
    }
}
