use chrono::{DateTime, Local, Utc};
use serde_json::json;

use super::{day_bounds, parse_day, parse_instant, session_row, App};
use crate::cli::args::SessionCommands;
use crate::error::WorktimeError;
use crate::features::hours::{format_hours, PeriodTotals, WorkHours};
use crate::features::projects::{Project, ProjectStorage};
use crate::features::sessions::{
    NewSession, Session, SessionQuery, SessionRepository, SessionStorage, SessionUpdate, SortOrder,
};
use crate::output::{format_action, format_session, format_sessions};

/// Execute session subcommands.
///
/// # Errors
///
/// Returns an error if a project or session is unknown, a time cannot be
/// parsed, or the change would leave two sessions running.
pub fn session(app: &App, command: SessionCommands) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let hours = app.hours()?;
    let storage = SessionStorage::new(&db);
    let projects = ProjectStorage::new(&db);
    let now = Utc::now();

    match command {
        SessionCommands::List {
            project,
            from,
            to,
            limit,
        } => {
            let project = projects.resolve(&project)?;
            let calendar = hours.calendar();
            let first = from.map(|s| parse_day(&s, calendar, now)).transpose()?;
            let last = to.map(|s| parse_day(&s, calendar, now)).transpose()?;
            let (from, up_to) = day_bounds(calendar, first, last);

            let mut sessions = storage.sessions(
                &SessionQuery::for_project(project.id)
                    .between(from, up_to)
                    .order(SortOrder::Descending)
                    .limit(limit),
            )?;
            sessions.reverse();

            let totals = PeriodTotals::for_project(&storage, project.id, &hours)?;
            let rows: Vec<_> = sessions
                .into_iter()
                .map(|s| session_row(s, &hours, &totals, now))
                .collect();

            format_sessions(&project, &rows, app.format)
        }

        SessionCommands::Add {
            project,
            start,
            end,
            comment,
        } => {
            let project = projects.resolve(&project)?;
            let start = parse_instant(&start, hours.calendar(), now)?;
            let new = match end {
                Some(end) => {
                    NewSession::closed(project.id, start, parse_instant(&end, hours.calendar(), now)?)
                }
                None => NewSession::running(project.id, start),
            };

            let id = storage.create_session(new.with_comment(comment))?;
            let session = load(&storage, id)?;
            changed(app, &hours, &project, session, "Added", now)
        }

        SessionCommands::Edit {
            id,
            start,
            end,
            running,
            comment,
            project,
        } => {
            let calendar = hours.calendar();
            let update = SessionUpdate {
                project_id: project
                    .map(|p| projects.resolve(&p).map(|p| p.id))
                    .transpose()?,
                start: start.map(|s| parse_instant(&s, calendar, now)).transpose()?,
                end: if running {
                    Some(None)
                } else {
                    end.map(|s| parse_instant(&s, calendar, now).map(Some))
                        .transpose()?
                },
                comment: comment.map(|c| {
                    let c = c.trim().to_string();
                    (!c.is_empty()).then_some(c)
                }),
            };

            if update.is_empty() {
                return Err(WorktimeError::InvalidData(
                    "nothing to change; pass --start, --end, --running, --comment or --project"
                        .to_string(),
                ));
            }

            storage.update_session(id, update)?;
            let session = load(&storage, id)?;
            let project = owner(&projects, &session)?;
            changed(app, &hours, &project, session, "Updated", now)
        }

        SessionCommands::Delete { id } => {
            if !storage.delete_session(id)? {
                return Err(WorktimeError::NotFound(format!("session {id}")));
            }
            format_action(&format!("Deleted session #{id}"), &json!({ "deleted": id }), app.format)
        }

        SessionCommands::Show { id } => {
            let session = load(&storage, id)?;
            let project = owner(&projects, &session)?;
            let totals = PeriodTotals::for_project(&storage, project.id, &hours)?;
            format_session(&project, &session_row(session, &hours, &totals, now), app.format)
        }
    }
}

fn load(storage: &SessionStorage<'_>, id: i64) -> Result<Session, WorktimeError> {
    storage
        .session(id)?
        .ok_or_else(|| WorktimeError::NotFound(format!("session {id}")))
}

fn owner(projects: &ProjectStorage<'_>, session: &Session) -> Result<Project, WorktimeError> {
    projects
        .get(session.project_id)?
        .ok_or_else(|| WorktimeError::NotFound(format!("project {}", session.project_id)))
}

fn changed(
    app: &App,
    hours: &WorkHours<Local>,
    project: &Project,
    session: Session,
    verb: &str,
    now: DateTime<Utc>,
) -> Result<String, WorktimeError> {
    let message = format!(
        "{verb} session #{} for {} ({} h)",
        session.id,
        project.name,
        format_hours(hours.session_hours(&session, now))
    );
    format_action(&message, &session, app.format)
}
