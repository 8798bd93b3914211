//! Output formatting for worktime.
//!
//! Every command result can be printed as colored text or as JSON.

mod json;
mod pretty;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::WorktimeError;
use crate::features::hours::{PeriodKind, PeriodTotal};
use crate::features::projects::{Project, ProjectSummary};
use crate::features::sessions::Session;

pub use json::*;
pub use pretty::*;

/// A session with its work hours and the period totals anchored on it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRow {
    #[serde(flatten)]
    pub session: Session,
    /// Local wall-clock start, for display.
    #[serde(skip)]
    pub local_start: NaiveDateTime,
    #[serde(skip)]
    pub local_end: Option<NaiveDateTime>,
    pub hours: f64,
    pub week_total: Option<PeriodTotal>,
    pub month_total: Option<PeriodTotal>,
}

/// The running session, if any.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub project: Project,
    pub session: Session,
    #[serde(skip)]
    pub local_start: NaiveDateTime,
    /// Work hours so far.
    pub elapsed_hours: f64,
}

/// Format project summaries.
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_projects(
    projects: &[ProjectSummary],
    format: OutputFormat,
) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_projects_pretty(projects)),
        OutputFormat::Json => format_projects_json(projects),
    }
}

/// Format a project's sessions.
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_sessions(
    project: &Project,
    rows: &[SessionRow],
    format: OutputFormat,
) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(project, rows)),
        OutputFormat::Json => format_sessions_json(project, rows),
    }
}

/// Format a single session.
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_session(
    project: &Project,
    row: &SessionRow,
    format: OutputFormat,
) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_session_pretty(project, row)),
        OutputFormat::Json => format_session_json(project, row),
    }
}

/// Format period totals.
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_totals(
    project: &Project,
    kind: PeriodKind,
    totals: &[PeriodTotal],
    format: OutputFormat,
) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_totals_pretty(project, kind, totals)),
        OutputFormat::Json => format_totals_json(project, kind, totals),
    }
}

/// Format tracker status.
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_status(
    status: Option<&StatusView>,
    format: OutputFormat,
) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(status)),
        OutputFormat::Json => format_status_json(status),
    }
}

/// Format the configuration (YAML when pretty).
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_config(config: &Config, format: OutputFormat) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => config.to_yaml(),
        OutputFormat::Json => to_json(config),
    }
}

/// Format the outcome of a change: a message, or the changed value as JSON.
///
/// # Errors
///
/// Returns `WorktimeError::Parse` if JSON serialization fails.
pub fn format_action<T: Serialize>(
    message: &str,
    value: &T,
    format: OutputFormat,
) -> Result<String, WorktimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_action_pretty(message)),
        OutputFormat::Json => to_json(value),
    }
}
