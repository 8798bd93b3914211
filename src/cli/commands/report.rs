use chrono::Utc;
use tracing::debug;

use super::{parse_day, App};
use crate::cli::args::{OutputFormat, ReportArgs};
use crate::error::WorktimeError;
use crate::features::projects::ProjectStorage;
use crate::features::report::{render, ProjectReport, ReportPeriod};
use crate::features::sessions::SessionStorage;
use crate::output::{format_action, to_json};

/// Build a project report and print it or write it to a file.
///
/// # Errors
///
/// Returns an error for an unknown project, a bad period, or a failure to
/// read sessions or write the file.
pub fn report(app: &App, args: ReportArgs) -> Result<String, WorktimeError> {
    let db = app.database()?;
    let hours = app.hours()?;
    let now = Utc::now();

    let project = ProjectStorage::new(&db).resolve(&args.project)?;

    let mut options = app.config.report_options();
    if let Some(period) = &args.period {
        options.period = ReportPeriod::parse(period).ok_or_else(|| {
            WorktimeError::InvalidData(format!(
                "unknown period '{period}', expected this-month, last-month, this-week, last-week or all"
            ))
        })?;
    }
    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let first = parse_day(from, hours.calendar(), now)?;
        let last = parse_day(to, hours.calendar(), now)?;
        if last < first {
            return Err(WorktimeError::InvalidData(format!(
                "report range ends ({last}) before it starts ({first})"
            )));
        }
        options.period = ReportPeriod::Custom(first, last);
    }
    options.week_totals &= !args.no_week_totals;
    options.month_totals &= !args.no_month_totals;
    options.group_by_day &= !args.no_group_by_day;

    let report =
        ProjectReport::generate(&SessionStorage::new(&db), &project, &options, &hours, now)
            .map_err(unavailable)?;
    debug!(project = project.id, lines = report.lines.len(), period = options.period.name(), "report generated");

    let rendered = match app.format {
        OutputFormat::Json if args.file.is_none() => return to_json(&report),
        _ => render(&report, args.format),
    };

    let Some(path) = args.file else {
        return Ok(rendered);
    };

    std::fs::write(&path, rendered)?;
    format_action(
        &format!("Wrote {} to {}", report.title(), path.display()),
        &serde_json::json!({ "file": path, "lines": report.lines.len(), "total_hours": report.total_hours }),
        app.format,
    )
}

fn unavailable(e: WorktimeError) -> WorktimeError {
    match e {
        WorktimeError::Database(msg) => WorktimeError::Database(format!("report unavailable: {msg}")),
        WorktimeError::InvalidData(msg) => {
            WorktimeError::InvalidData(format!("report unavailable: {msg}"))
        }
        other => other,
    }
}
