//! Work sessions: records, the store and the start/stop tracker.

mod repository;
mod session;
mod storage;
mod tracker;

#[cfg(test)]
pub use repository::MockSessionRepository;
pub use repository::SessionRepository;
pub use session::{
    NewSession, Session, SessionQuery, SessionState, SessionUpdate, SortOrder,
};
pub use storage::SessionStorage;
pub use tracker::Tracker;
