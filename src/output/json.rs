//! JSON output formatting for worktime.

use serde::Serialize;
use serde_json::json;

use super::{SessionRow, StatusView};
use crate::error::WorktimeError;
use crate::features::hours::{PeriodKind, PeriodTotal};
use crate::features::projects::{Project, ProjectSummary};

/// Format project summaries as JSON
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_projects_json(projects: &[ProjectSummary]) -> Result<String, WorktimeError> {
    let output = json!({
        "count": projects.len(),
        "items": projects
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a project's sessions as JSON
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_sessions_json(project: &Project, rows: &[SessionRow]) -> Result<String, WorktimeError> {
    let output = json!({
        "project": project,
        "count": rows.len(),
        "total_hours": rows.iter().map(|r| r.hours).sum::<f64>(),
        "items": rows
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a single session as JSON
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_session_json(project: &Project, row: &SessionRow) -> Result<String, WorktimeError> {
    let output = json!({
        "project": project,
        "session": row
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format period totals as JSON
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_totals_json(
    project: &Project,
    kind: PeriodKind,
    totals: &[PeriodTotal],
) -> Result<String, WorktimeError> {
    let output = json!({
        "project": project,
        "kind": kind,
        "count": totals.len(),
        "items": totals
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format tracker status as JSON
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_status_json(status: Option<&StatusView>) -> Result<String, WorktimeError> {
    let output = status.map_or_else(
        || json!({ "running": false }),
        |view| {
            json!({
                "running": true,
                "project": view.project,
                "session": view.session,
                "elapsed_hours": view.elapsed_hours
            })
        },
    );
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, WorktimeError> {
    Ok(serde_json::to_string_pretty(value)?)
}
