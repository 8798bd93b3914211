use super::App;
use crate::error::WorktimeError;
use crate::features::hours::{PeriodKind, PeriodTotals};
use crate::features::projects::ProjectStorage;
use crate::features::sessions::SessionStorage;
use crate::output::format_totals;

/// Show a project's weekly or monthly totals, newest first.
///
/// # Errors
///
/// Returns `NotFound` for an unknown project or a database error.
pub fn totals(app: &App, project: &str, by: PeriodKind) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let hours = app.hours()?;

    let project = ProjectStorage::new(&db).resolve(project)?;
    let totals = PeriodTotals::for_project(&SessionStorage::new(&db), project.id, &hours)?;

    format_totals(&project, by, totals.of_kind(by), app.format)
}
