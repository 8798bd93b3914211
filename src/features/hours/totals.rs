//! Weekly and monthly totals.
//!
//! Sessions are grouped into runs of consecutive sessions that share a
//! period key, in iteration order. Callers must pass sessions sorted by
//! start time (either direction) so that each period forms a single run.
//! On unsorted input a period can appear more than once; each run is still
//! emitted separately and a warning is logged.
//!
//! Each total is anchored to the id of the first session of its run. With
//! sessions in descending order that is the chronologically last session of
//! the period, which is where listings print the total.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;

use super::calculator::WorkHours;
use crate::core::{Calendar, MonthKey, WeekKey};
use crate::error::WorktimeError;
use crate::features::sessions::{Session, SessionQuery, SessionRepository, SortOrder};

/// Which calendar period to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Week,
    Month,
}

/// Key of a week or a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PeriodKey {
    Week(WeekKey),
    Month(MonthKey),
}

impl PeriodKey {
    /// Key of `instant` for the given kind.
    #[must_use]
    pub fn of<Tz: TimeZone>(kind: PeriodKind, instant: &DateTime<Utc>, calendar: &Calendar<Tz>) -> Self {
        match kind {
            PeriodKind::Week => Self::Week(calendar.week_key(instant)),
            PeriodKind::Month => Self::Month(calendar.month_key(instant)),
        }
    }

    /// Human label: "Week 42" or "October".
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Week(key) => format!("Week {}", key.week),
            Self::Month(key) => key.name().to_string(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Week(key) => write!(f, "{key}"),
            Self::Month(key) => write!(f, "{key}"),
        }
    }
}

/// Summed work hours of one run of sessions sharing a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub key: PeriodKey,
    /// First session of the run in iteration order.
    pub anchor_session_id: i64,
    /// Sum of the per-session rounded hours.
    pub total_hours: f64,
    pub session_count: usize,
}

/// Group closed sessions into period totals.
///
/// # Errors
///
/// Returns `InvalidData` if a session is still running.
pub fn aggregate_totals<'s, Tz, I>(
    sessions: I,
    kind: PeriodKind,
    hours: &WorkHours<Tz>,
) -> Result<Vec<PeriodTotal>, WorktimeError>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'s Session>,
{
    let mut totals = Vec::new();
    let mut current: Option<PeriodTotal> = None;
    let mut finished: HashSet<PeriodKey> = HashSet::new();

    for session in sessions {
        let Some(end) = session.end else {
            return Err(WorktimeError::InvalidData(format!(
                "session {} is still running and has no work hours yet",
                session.id
            )));
        };

        let key = PeriodKey::of(kind, &session.start, hours.calendar());
        let starts_run = current.as_ref().map_or(true, |total| total.key != key);
        if starts_run {
            if let Some(done) = current.take() {
                finished.insert(done.key);
                totals.push(done);
            }
            if finished.contains(&key) {
                warn!(
                    period = %key,
                    session = session.id,
                    "period appears again after a different one; input is not sorted by start"
                );
            }
            current = Some(PeriodTotal {
                key,
                anchor_session_id: session.id,
                total_hours: 0.0,
                session_count: 0,
            });
        }

        if let Some(total) = current.as_mut() {
            total.total_hours += hours.hours(&session.start, &end);
            total.session_count += 1;
        }
    }

    totals.extend(current);
    Ok(totals)
}

/// Week and month totals of one project, looked up by anchor session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodTotals {
    pub weeks: Vec<PeriodTotal>,
    pub months: Vec<PeriodTotal>,
    #[serde(skip)]
    week_by_anchor: HashMap<i64, usize>,
    #[serde(skip)]
    month_by_anchor: HashMap<i64, usize>,
}

impl PeriodTotals {
    /// Compute both kinds of totals over sorted closed sessions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if a session is still running.
    pub fn compute<Tz: TimeZone>(
        sessions: &[Session],
        hours: &WorkHours<Tz>,
    ) -> Result<Self, WorktimeError> {
        let weeks = aggregate_totals(sessions, PeriodKind::Week, hours)?;
        let months = aggregate_totals(sessions, PeriodKind::Month, hours)?;
        Ok(Self::from_totals(weeks, months))
    }

    /// Compute totals over a project's whole closed history, newest first.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn for_project<R, Tz>(
        repo: &R,
        project_id: i64,
        hours: &WorkHours<Tz>,
    ) -> Result<Self, WorktimeError>
    where
        R: SessionRepository + ?Sized,
        Tz: TimeZone,
    {
        let sessions = repo.sessions(
            &SessionQuery::for_project(project_id)
                .closed()
                .order(SortOrder::Descending),
        )?;
        Self::compute(&sessions, hours)
    }

    fn from_totals(weeks: Vec<PeriodTotal>, months: Vec<PeriodTotal>) -> Self {
        fn index(totals: &[PeriodTotal]) -> HashMap<i64, usize> {
            totals
                .iter()
                .enumerate()
                .map(|(i, total)| (total.anchor_session_id, i))
                .collect()
        }

        Self {
            week_by_anchor: index(&weeks),
            month_by_anchor: index(&months),
            weeks,
            months,
        }
    }

    /// The week total anchored at `session_id`.
    #[must_use]
    pub fn week_for(&self, session_id: i64) -> Option<&PeriodTotal> {
        self.week_by_anchor
            .get(&session_id)
            .and_then(|&i| self.weeks.get(i))
    }

    /// The month total anchored at `session_id`.
    #[must_use]
    pub fn month_for(&self, session_id: i64) -> Option<&PeriodTotal> {
        self.month_by_anchor
            .get(&session_id)
            .and_then(|&i| self.months.get(i))
    }

    /// Totals of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: PeriodKind) -> &[PeriodTotal] {
        match kind {
            PeriodKind::Week => &self.weeks,
            PeriodKind::Month => &self.months,
        }
    }
}
