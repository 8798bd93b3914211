use chrono::Utc;
use serde_json::json;

use super::App;
use crate::cli::args::ProjectCommands;
use crate::error::WorktimeError;
use crate::features::projects::{ProjectStorage, ProjectSummary};
use crate::features::sessions::{SessionQuery, SessionRepository, SessionStorage};
use crate::output::{format_action, format_projects};

/// Execute project subcommands.
///
/// # Errors
///
/// Returns an error if the project is unknown or the database fails.
pub fn project(app: &App, command: ProjectCommands) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let projects = ProjectStorage::new(&db);

    match command {
        ProjectCommands::List => {
            let hours = app.hours()?;
            let sessions = SessionStorage::new(&db);
            let now = Utc::now();

            let mut summaries = Vec::new();
            for project in projects.list()? {
                let counts = projects.counts(project.id)?;
                let total_hours = sessions
                    .sessions(&SessionQuery::for_project(project.id).closed())?
                    .iter()
                    .map(|s| hours.session_hours(s, now))
                    .sum();

                summaries.push(ProjectSummary {
                    id: project.id,
                    name: project.name,
                    session_count: counts.sessions,
                    running: counts.running,
                    total_hours,
                });
            }

            format_projects(&summaries, app.format)
        }

        ProjectCommands::Add { name } => {
            let project = projects.create(&name)?;
            format_action(&format!("Created project {project}"), &project, app.format)
        }

        ProjectCommands::Rename { project, name } => {
            let old = projects.resolve(&project)?;
            let renamed = projects.rename(old.id, &name)?;
            format_action(
                &format!("Renamed '{}' to {renamed}", old.name),
                &renamed,
                app.format,
            )
        }

        ProjectCommands::Delete { project, yes } => {
            let project = projects.resolve(&project)?;
            if !yes {
                let counts = projects.counts(project.id)?;
                return Err(WorktimeError::InvalidData(format!(
                    "deleting {project} also deletes its {} sessions; pass --yes to confirm",
                    counts.sessions
                )));
            }

            let removed = projects.delete(project.id)?;
            format_action(
                &format!("Deleted {project} and {removed} sessions"),
                &json!({ "project": project, "deleted_sessions": removed }),
                app.format,
            )
        }
    }
}
