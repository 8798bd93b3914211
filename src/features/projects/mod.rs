//! Projects: named buckets that own sessions.

mod project;
mod storage;

pub use project::{Project, ProjectSummary};
pub use storage::{ProjectCounts, ProjectStorage};
