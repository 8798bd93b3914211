//! Project records.

use serde::{Deserialize, Serialize};

/// A named bucket of sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// A project with its session statistics, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub session_count: usize,
    /// Whether this project owns the running session.
    pub running: bool,
    /// Work hours over all closed sessions.
    pub total_hours: f64,
}

/// Normalise a user-supplied project name.
pub(crate) fn clean_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
