//! Session records.
//!
//! A session is one contiguous work interval for a project. It is running
//! while `end` is `None`; closing it sets `end`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// State of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No end time yet
    Running,
    /// Has an end time
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned id
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// When work started
    pub start: DateTime<Utc>,
    /// When work ended (None while running)
    pub end: Option<DateTime<Utc>>,
    /// Free-text note
    pub comment: Option<String>,
}

impl Session {
    /// Whether the session is still running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.end.is_none()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.is_running() {
            SessionState::Running
        } else {
            SessionState::Closed
        }
    }

    /// End time, or `now` for a running session.
    #[must_use]
    pub fn end_or(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end.unwrap_or(now)
    }

    /// Wall-clock time between start and end (or `now`).
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (self.end_or(now) - self.start).max(Duration::zero())
    }

    /// The comment, if it has any non-whitespace text.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// A session to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub project_id: i64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

impl NewSession {
    /// A running session starting at `start`.
    #[must_use]
    pub const fn running(project_id: i64, start: DateTime<Utc>) -> Self {
        Self {
            project_id,
            start,
            end: None,
            comment: None,
        }
    }

    /// A closed session.
    #[must_use]
    pub const fn closed(project_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            project_id,
            start,
            end: Some(end),
            comment: None,
        }
    }

    /// Attach a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

/// Changes to apply to a stored session. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub project_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    /// `Some(None)` reopens the session.
    pub end: Option<Option<DateTime<Utc>>>,
    /// `Some(None)` clears the comment.
    pub comment: Option<Option<String>>,
}

impl SessionUpdate {
    /// Close a session at `end`.
    #[must_use]
    pub fn close_at(end: DateTime<Utc>) -> Self {
        Self {
            end: Some(Some(end)),
            ..Self::default()
        }
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.comment.is_none()
    }

    /// Apply the update to an in-memory session.
    pub fn apply(&self, session: &mut Session) {
        if let Some(project_id) = self.project_id {
            session.project_id = project_id;
        }
        if let Some(start) = self.start {
            session.start = start;
        }
        if let Some(end) = self.end {
            session.end = end;
        }
        if let Some(comment) = &self.comment {
            session.comment.clone_from(comment);
        }
    }
}

/// Sort direction by session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// SQL keyword for this order.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Filter for session queries.
///
/// `from` is inclusive and `to` exclusive; both compare against `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub project_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub closed_only: bool,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl SessionQuery {
    /// All sessions of a project, ascending.
    #[must_use]
    pub fn for_project(project_id: i64) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Restrict to sessions starting in `[from, to)`.
    #[must_use]
    pub const fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Skip running sessions.
    #[must_use]
    pub const fn closed(mut self) -> Self {
        self.closed_only = true;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub const fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Return at most `limit` sessions.
    #[must_use]
    pub const fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    fn session(end: Option<DateTime<Utc>>) -> Session {
        Session {
            id: 1,
            project_id: 1,
            start: at(9, 0),
            end,
            comment: None,
        }
    }

    #[test]
    fn test_state() {
        assert_eq!(session(None).state(), SessionState::Running);
        assert_eq!(session(Some(at(10, 0))).state(), SessionState::Closed);
        assert_eq!(SessionState::Running.to_string(), "running");
    }

    #[test]
    fn test_elapsed_uses_now_when_running() {
        let running = session(None);
        assert_eq!(running.elapsed(at(11, 30)), Duration::minutes(150));

        let closed = session(Some(at(10, 0)));
        assert_eq!(closed.elapsed(at(11, 30)), Duration::hours(1));
    }

    #[test]
    fn test_elapsed_never_negative() {
        let backwards = session(Some(at(8, 0)));
        assert_eq!(backwards.elapsed(at(12, 0)), Duration::zero());
    }

    #[test]
    fn test_note_ignores_blank_comments() {
        let mut s = session(None);
        assert_eq!(s.note(), None);
        s.comment = Some("   ".to_string());
        assert_eq!(s.note(), None);
        s.comment = Some(" review ".to_string());
        assert_eq!(s.note(), Some("review"));
    }

    #[test]
    fn test_update_apply() {
        let mut s = session(None);
        let update = SessionUpdate {
            end: Some(Some(at(12, 0))),
            comment: Some(Some("done".to_string())),
            ..SessionUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply(&mut s);
        assert_eq!(s.end, Some(at(12, 0)));
        assert_eq!(s.comment.as_deref(), Some("done"));

        SessionUpdate {
            end: Some(None),
            ..SessionUpdate::default()
        }
        .apply(&mut s);
        assert!(s.is_running());
    }

    #[test]
    fn test_query_builder() {
        let query = SessionQuery::for_project(7)
            .between(Some(at(0, 0)), None)
            .closed()
            .order(SortOrder::Descending);
        assert_eq!(query.project_id, Some(7));
        assert!(query.closed_only);
        assert_eq!(query.order.as_sql(), "DESC");
        assert!(SessionUpdate::default().is_empty());
    }
}
