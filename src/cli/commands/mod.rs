//! Command implementations for worktime.
//!
//! Each command returns the text to print; `main` prints it.

mod backup;
mod completions;
mod config;
mod project;
mod report;
mod session;
mod totals;
mod track;

pub use backup::backup;
pub use completions::completions;
pub use config::config;
pub use project::project;
pub use report::report;
pub use session::session;
pub use totals::totals;
pub use track::{start, status, stop};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::cli::args::OutputFormat;
use crate::config::{Config, Paths};
use crate::core::{parse_date, parse_date_time, Calendar};
use crate::error::WorktimeError;
use crate::features::hours::{PeriodTotals, WorkHours};
use crate::features::sessions::Session;
use crate::output::SessionRow;
use crate::storage::Database;

/// Everything a command needs besides its arguments.
#[derive(Debug, Clone)]
pub struct App {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
}

impl App {
    #[must_use]
    pub const fn new(paths: Paths, config: Config, format: OutputFormat) -> Self {
        Self {
            paths,
            config,
            format,
        }
    }

    /// Open (and migrate) the database under the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be opened.
    pub fn database(&self) -> Result<Database, WorktimeError> {
        self.paths.ensure_dirs()?;
        Database::open_at(&self.paths.database)
    }

    /// The work-hours engine in the local time zone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the settings are out of range.
    pub fn hours(&self) -> Result<WorkHours<Local>, WorktimeError> {
        self.config.hours_engine(Local)
    }
}

/// Parse a user-supplied moment in the calendar's time zone.
pub(crate) fn parse_instant<Tz: TimeZone>(
    input: &str,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, WorktimeError> {
    let today = calendar.local_date(&now);
    let local = parse_date_time(input, today).ok_or_else(|| {
        WorktimeError::Parse(format!(
            "could not understand time '{input}' (try \"9:30\", \"yesterday 17:00\" or \"2024-03-04 09:00\")"
        ))
    })?;
    Ok(calendar.at_local(local.date(), local.time()))
}

/// Parse a user-supplied day relative to today in the calendar's time zone.
pub(crate) fn parse_day<Tz: TimeZone>(
    input: &str,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> Result<NaiveDate, WorktimeError> {
    parse_date(input, calendar.local_date(&now)).ok_or_else(|| {
        WorktimeError::Parse(format!(
            "could not understand date '{input}' (try \"monday\", \"7 days ago\" or \"2024-03-04\")"
        ))
    })
}

/// `[from, up_to)` covering the inclusive days `first..=last`.
pub(crate) fn day_bounds<Tz: TimeZone>(
    calendar: &Calendar<Tz>,
    first: Option<NaiveDate>,
    last: Option<NaiveDate>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    (
        first.map(|day| calendar.start_of_day(day)),
        last.map(|day| calendar.start_of_day(day + Duration::days(1))),
    )
}

fn local_time<Tz: TimeZone>(calendar: &Calendar<Tz>, instant: &DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(calendar.timezone()).naive_local()
}

/// Display row for a session, with the totals anchored on it.
pub(crate) fn session_row<Tz: TimeZone>(
    session: Session,
    hours: &WorkHours<Tz>,
    totals: &PeriodTotals,
    now: DateTime<Utc>,
) -> SessionRow {
    let calendar = hours.calendar();
    SessionRow {
        local_start: local_time(calendar, &session.start),
        local_end: session.end.map(|end| local_time(calendar, &end)),
        hours: hours.session_hours(&session, now),
        week_total: totals.week_for(session.id).cloned(),
        month_total: totals.month_for(session.id).cloned(),
        session,
    }
}
