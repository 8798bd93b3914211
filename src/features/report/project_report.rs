//! Project reports.
//!
//! A report lists the closed sessions of one project inside a period, one
//! line per session or per day, and prints each week and month total after
//! the line holding the total's anchor session. Totals always cover the
//! project's whole history, not just the period.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::period::{PeriodRange, ReportPeriod};
use crate::error::WorktimeError;
use crate::features::hours::{PeriodTotal, PeriodTotals, WorkHours};
use crate::features::projects::Project;
use crate::features::sessions::{SessionQuery, SessionRepository};

/// What a report includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub period: ReportPeriod,
    pub week_totals: bool,
    pub month_totals: bool,
    /// Merge sessions of the same day into one line.
    pub group_by_day: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            period: ReportPeriod::default(),
            week_totals: true,
            month_totals: true,
            group_by_day: true,
        }
    }
}

/// A period total printed under a report line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalLine {
    /// "Week 42 total", "October total"
    pub label: String,
    pub hours: f64,
}

impl TotalLine {
    fn from_total(total: &PeriodTotal) -> Self {
        Self {
            label: format!("{} total", total.key.label()),
            hours: total.total_hours,
        }
    }
}

/// One row of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub date: NaiveDate,
    pub hours: f64,
    pub comment: Option<String>,
    /// Sessions merged into this line, oldest first.
    pub session_ids: Vec<i64>,
    pub week_total: Option<TotalLine>,
    pub month_total: Option<TotalLine>,
}

impl ReportLine {
    fn last_session_id(&self) -> Option<i64> {
        self.session_ids.last().copied()
    }

    fn append_comment(&mut self, note: &str) {
        self.comment = Some(match self.comment.take() {
            Some(existing) => format!("{existing}, {note}"),
            None => note.to_string(),
        });
    }
}

/// A generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: Project,
    pub period: PeriodRange,
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<ReportLine>,
    pub total_hours: f64,
}

impl ProjectReport {
    /// Build the report for `project` at `now`.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub fn generate<R, Tz>(
        repo: &R,
        project: &Project,
        options: &ReportOptions,
        hours: &WorkHours<Tz>,
        now: DateTime<Utc>,
    ) -> Result<Self, WorktimeError>
    where
        R: SessionRepository + ?Sized,
        Tz: TimeZone,
    {
        let calendar = hours.calendar();
        let period = options.period.range(calendar, &now);

        let totals = if options.week_totals || options.month_totals {
            PeriodTotals::for_project(repo, project.id, hours)?
        } else {
            PeriodTotals::default()
        };

        let sessions = repo.sessions(
            &SessionQuery::for_project(project.id)
                .between(period.from, period.up_to)
                .closed(),
        )?;

        let mut lines: Vec<ReportLine> = Vec::new();
        for session in &sessions {
            let date = calendar.local_date(&session.start);
            let session_hours = hours.session_hours(session, now);

            let merge = options.group_by_day && lines.last().is_some_and(|line| line.date == date);
            if merge {
                if let Some(line) = lines.last_mut() {
                    line.hours += session_hours;
                    line.session_ids.push(session.id);
                    if let Some(note) = session.note() {
                        line.append_comment(note);
                    }
                }
            } else {
                lines.push(ReportLine {
                    date,
                    hours: session_hours,
                    comment: session.note().map(str::to_string),
                    session_ids: vec![session.id],
                    week_total: None,
                    month_total: None,
                });
            }
        }

        for line in &mut lines {
            let Some(last_id) = line.last_session_id() else {
                continue;
            };
            if options.week_totals {
                line.week_total = totals.week_for(last_id).map(TotalLine::from_total);
            }
            if options.month_totals {
                line.month_total = totals.month_for(last_id).map(TotalLine::from_total);
            }
        }

        let total_hours = lines.iter().map(|line| line.hours).sum();

        Ok(Self {
            project: project.clone(),
            period,
            generated_at: now,
            lines,
            total_hours,
        })
    }

    /// Report title.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} - {}", self.project.name, self.period.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Calendar, WeekRule};
    use crate::features::hours::WorkHoursConfig;
    use crate::features::projects::ProjectStorage;
    use crate::features::sessions::{MockSessionRepository, NewSession, SessionStorage};
    use crate::storage::Database;

    const EPS: f64 = 1e-9;

    fn hours() -> WorkHours<Utc> {
        let config = WorkHoursConfig {
            precision_hours: 0.25,
            ..WorkHoursConfig::default()
        };
        WorkHours::new(config, Calendar::new(Utc, WeekRule::ISO)).unwrap()
    }

    fn at(m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).unwrap()
    }

    fn add(storage: &SessionStorage<'_>, project: i64, start: DateTime<Utc>, hours: i64, note: &str) -> i64 {
        let comment = (!note.is_empty()).then(|| note.to_string());
        storage
            .create_session(
                NewSession::closed(project, start, start + chrono::Duration::hours(hours))
                    .with_comment(comment),
            )
            .unwrap()
    }

    #[test]
    fn test_grouped_report_with_totals() {
        let db = Database::open_in_memory().unwrap();
        let project = ProjectStorage::new(&db).create("Acme").unwrap();
        let storage = SessionStorage::new(&db);

        // Week 40: Oct 1 (two sessions) and Oct 2
        add(&storage, project.id, at(10, 1, 9), 2, "planning");
        add(&storage, project.id, at(10, 1, 13), 3, "");
        add(&storage, project.id, at(10, 1, 17), 1, "review");
        let week40_last = add(&storage, project.id, at(10, 2, 9), 4, "");
        // Week 41: Oct 8
        let october_last = add(&storage, project.id, at(10, 8, 9), 5, "deploy");

        let options = ReportOptions {
            period: ReportPeriod::ThisMonth,
            ..ReportOptions::default()
        };
        let report =
            ProjectReport::generate(&storage, &project, &options, &hours(), at(10, 16, 12)).unwrap();

        assert_eq!(report.title(), "Acme - This month (October)");
        assert_eq!(report.lines.len(), 3);

        let first = &report.lines[0];
        assert!((first.hours - 6.0).abs() < EPS);
        assert_eq!(first.comment.as_deref(), Some("planning, review"));
        assert!(first.week_total.is_none());

        let second = &report.lines[1];
        assert_eq!(second.session_ids, vec![week40_last]);
        let week = second.week_total.as_ref().unwrap();
        assert_eq!(week.label, "Week 40 total");
        assert!((week.hours - 10.0).abs() < EPS);
        assert!(second.month_total.is_none());

        let third = &report.lines[2];
        assert_eq!(third.session_ids, vec![october_last]);
        assert_eq!(third.week_total.as_ref().unwrap().label, "Week 41 total");
        let month = third.month_total.as_ref().unwrap();
        assert_eq!(month.label, "October total");
        assert!((month.hours - 15.0).abs() < EPS);

        assert!((report.total_hours - 15.0).abs() < EPS);
    }

    #[test]
    fn test_ungrouped_report_without_totals() {
        let db = Database::open_in_memory().unwrap();
        let project = ProjectStorage::new(&db).create("Acme").unwrap();
        let storage = SessionStorage::new(&db);
        add(&storage, project.id, at(10, 1, 9), 2, "a");
        add(&storage, project.id, at(10, 1, 13), 3, "b");

        let options = ReportOptions {
            period: ReportPeriod::All,
            week_totals: false,
            month_totals: false,
            group_by_day: false,
        };
        let report =
            ProjectReport::generate(&storage, &project, &options, &hours(), at(10, 16, 12)).unwrap();

        assert_eq!(report.lines.len(), 2);
        assert!(report.lines.iter().all(|l| l.week_total.is_none() && l.month_total.is_none()));
        assert_eq!(report.lines[1].comment.as_deref(), Some("b"));
    }

    #[test]
    fn test_period_filters_lines_but_not_totals() {
        let db = Database::open_in_memory().unwrap();
        let project = ProjectStorage::new(&db).create("Acme").unwrap();
        let storage = SessionStorage::new(&db);
        add(&storage, project.id, at(9, 30, 9), 2, "");
        add(&storage, project.id, at(10, 1, 9), 1, "");

        let options = ReportOptions {
            period: ReportPeriod::ThisMonth,
            month_totals: false,
            ..ReportOptions::default()
        };
        let report =
            ProjectReport::generate(&storage, &project, &options, &hours(), at(10, 16, 12)).unwrap();

        // Sept 30 and Oct 1 share ISO week 40; the total spans both months
        assert_eq!(report.lines.len(), 1);
        let week = report.lines[0].week_total.as_ref().unwrap();
        assert!((week.hours - 3.0).abs() < EPS);
    }

    #[test]
    fn test_running_session_is_left_out() {
        let db = Database::open_in_memory().unwrap();
        let project = ProjectStorage::new(&db).create("Acme").unwrap();
        let storage = SessionStorage::new(&db);
        add(&storage, project.id, at(10, 1, 9), 2, "");
        storage
            .create_session(NewSession::running(project.id, at(10, 16, 9)))
            .unwrap();

        let report = ProjectReport::generate(
            &storage,
            &project,
            &ReportOptions::default(),
            &hours(),
            at(10, 16, 12),
        )
        .unwrap();
        assert_eq!(report.lines.len(), 1);
    }

    #[test]
    fn test_repository_failure_propagates() {
        let mut repo = MockSessionRepository::new();
        repo.expect_sessions()
            .returning(|_| Err(WorktimeError::Database("unavailable".to_string())));
        let project = Project {
            id: 1,
            name: "Acme".to_string(),
        };

        let err = ProjectReport::generate(
            &repo,
            &project,
            &ReportOptions::default(),
            &hours(),
            at(10, 16, 12),
        )
        .unwrap_err();
        assert!(matches!(err, WorktimeError::Database(_)));
    }
}
