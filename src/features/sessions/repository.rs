//! The session store seam.
//!
//! Aggregation, reporting and the tracker only see this trait, so they can
//! be tested against a mock store.

use super::session::{NewSession, Session, SessionQuery, SessionUpdate};
use crate::error::WorktimeError;

/// Read and write access to stored sessions.
///
/// Implementations must keep at most one running session in the whole
/// store and report a violation as [`WorktimeError::Conflict`].
#[cfg_attr(test, mockall::automock)]
pub trait SessionRepository {
    /// The running session, if any.
    fn open_session(&self) -> Result<Option<Session>, WorktimeError>;

    /// Sessions matching `query`, ordered by start.
    fn sessions(&self, query: &SessionQuery) -> Result<Vec<Session>, WorktimeError>;

    /// A single session by id.
    fn session(&self, id: i64) -> Result<Option<Session>, WorktimeError>;

    /// Insert a session and return its id.
    ///
    /// Inserting a running session while another one is open fails with
    /// `Conflict` and changes nothing.
    fn create_session(&self, new: NewSession) -> Result<i64, WorktimeError>;

    /// Apply `update` to session `id`.
    fn update_session(&self, id: i64, update: SessionUpdate) -> Result<(), WorktimeError>;

    /// Delete a session. Returns whether it existed.
    fn delete_session(&self, id: i64) -> Result<bool, WorktimeError>;
}
