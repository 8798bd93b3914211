use chrono::Utc;

use super::{local_time, parse_instant, App};
use crate::error::WorktimeError;
use crate::features::hours::format_hours;
use crate::features::projects::ProjectStorage;
use crate::features::sessions::{SessionStorage, Tracker};
use crate::output::{format_action, format_status, StatusView};

/// Start tracking a project.
///
/// # Errors
///
/// Returns `NotFound` for an unknown project and `Conflict` if a session is
/// already running.
pub fn start(
    app: &App,
    project: &str,
    at: Option<&str>,
    comment: Option<String>,
) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let calendar = app.config.calendar(chrono::Local)?;
    let now = Utc::now();

    let project = ProjectStorage::new(&db).resolve(project)?;
    let at = match at {
        Some(input) => parse_instant(input, &calendar, now)?,
        None => now,
    };

    let storage = SessionStorage::new(&db);
    let session = Tracker::new(&storage).start(project.id, at, comment)?;

    format_action(
        &format!(
            "Started {} at {}",
            project.name,
            local_time(&calendar, &session.start).format("%H:%M")
        ),
        &session,
        app.format,
    )
}

/// Stop the running session.
///
/// # Errors
///
/// Returns `NotFound` if nothing is running.
pub fn stop(app: &App, at: Option<&str>, comment: Option<String>) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let hours = app.hours()?;
    let now = Utc::now();

    let at = match at {
        Some(input) => parse_instant(input, hours.calendar(), now)?,
        None => now,
    };

    let storage = SessionStorage::new(&db);
    let session = Tracker::new(&storage).stop(at, comment)?;
    let name = ProjectStorage::new(&db)
        .get(session.project_id)?
        .map_or_else(|| format!("project {}", session.project_id), |p| p.name);

    format_action(
        &format!(
            "Stopped {name} after {} h",
            format_hours(hours.session_hours(&session, now))
        ),
        &session,
        app.format,
    )
}

/// Show the running session.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub fn status(app: &App) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let hours = app.hours()?;
    let now = Utc::now();

    let storage = SessionStorage::new(&db);
    let Some(session) = Tracker::new(&storage).status()? else {
        return format_status(None, app.format);
    };

    let project = ProjectStorage::new(&db)
        .get(session.project_id)?
        .ok_or_else(|| WorktimeError::NotFound(format!("project {}", session.project_id)))?;

    let view = StatusView {
        local_start: local_time(hours.calendar(), &session.start),
        elapsed_hours: hours.session_hours(&session, now),
        project,
        session,
    };
    format_status(Some(&view), app.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{OutputFormat, ProjectCommands};
    use crate::cli::commands::project;
    use crate::cli::commands::test_support::app;

    #[test]
    fn test_start_status_stop() {
        let (_dir, app) = app(OutputFormat::Json);
        project(&app, ProjectCommands::Add { name: "Acme".into() }).unwrap();

        let idle = status(&app).unwrap();
        assert!(idle.contains("\"running\": false"));

        start(&app, "Acme", None, Some("setup".into())).unwrap();
        let running = status(&app).unwrap();
        assert!(running.contains("\"running\": true"));
        assert!(running.contains("setup"));

        let stopped = stop(&app, None, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&stopped).unwrap();
        assert!(!value["end"].is_null());
        assert_eq!(value["comment"], "setup");
    }

    #[test]
    fn test_second_start_conflicts() {
        let (_dir, app) = app(OutputFormat::Pretty);
        project(&app, ProjectCommands::Add { name: "A".into() }).unwrap();
        project(&app, ProjectCommands::Add { name: "B".into() }).unwrap();

        start(&app, "A", None, None).unwrap();
        let err = start(&app, "B", None, None).unwrap_err();
        assert!(matches!(err, WorktimeError::Conflict(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_stop_without_running_session() {
        let (_dir, app) = app(OutputFormat::Pretty);
        let err = stop(&app, None, None).unwrap_err();
        assert!(matches!(err, WorktimeError::NotFound(_)));
    }
}
