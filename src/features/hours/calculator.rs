//! Per-session work hours.
//!
//! Effective time is the wall-clock duration minus the overlap with the
//! daily lunch window (when excluded), rounded half-up to the configured
//! precision.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::config::WorkHoursConfig;
use crate::core::Calendar;
use crate::error::WorktimeError;
use crate::features::sessions::Session;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// A validated work-hours configuration bound to a calendar.
#[derive(Debug, Clone)]
pub struct WorkHours<Tz: TimeZone> {
    config: WorkHoursConfig,
    calendar: Calendar<Tz>,
}

impl<Tz: TimeZone> WorkHours<Tz> {
    /// Validate `config` and bind it to `calendar`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is out of range.
    pub fn new(config: WorkHoursConfig, calendar: Calendar<Tz>) -> Result<Self, WorktimeError> {
        config.validate()?;
        Ok(Self { config, calendar })
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkHoursConfig {
        &self.config
    }

    /// The calendar used for lunch windows and period keys.
    #[must_use]
    pub const fn calendar(&self) -> &Calendar<Tz> {
        &self.calendar
    }

    /// Time in `[start, end)` that falls inside lunch windows.
    ///
    /// Walks local days forward from the one containing `start` and stops at
    /// the first day whose window does not overlap.
    #[must_use]
    pub fn lunch_overlap(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> Duration {
        if !self.config.exclude_lunch || end <= start {
            return Duration::zero();
        }

        let (lunch_start, lunch_end) = self.config.lunch_window();

        self.calendar
            .local_date(start)
            .iter_days()
            .map(|day| {
                let window_start = self.calendar.at_local(day, lunch_start);
                let window_end = self.calendar.at_local(day, lunch_end);
                (*end.min(&window_end) - *start.max(&window_start)).max(Duration::zero())
            })
            .take_while(|overlap| *overlap > Duration::zero())
            .fold(Duration::zero(), |acc, overlap| acc + overlap)
    }

    /// Duration that counts as work, never negative.
    #[must_use]
    pub fn effective_duration(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> Duration {
        (*end - *start - self.lunch_overlap(start, end)).max(Duration::zero())
    }

    /// Rounded work hours for `[start, end)`.
    #[must_use]
    pub fn hours(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> f64 {
        round_to_precision(self.effective_duration(start, end), self.config.precision_hours)
    }

    /// Rounded work hours of a session; a running session counts up to `now`.
    #[must_use]
    pub fn session_hours(&self, session: &Session, now: DateTime<Utc>) -> f64 {
        self.hours(&session.start, &session.end_or(now))
    }
}

/// Rounded work hours for `[start, end)` under `config`.
///
/// # Errors
///
/// Returns `InvalidConfig` if `config` is out of range.
pub fn work_hours<Tz: TimeZone>(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    config: &WorkHoursConfig,
    calendar: &Calendar<Tz>,
) -> Result<f64, WorktimeError> {
    Ok(WorkHours::new(*config, calendar.clone())?.hours(start, end))
}

/// Format hours with up to five decimals and no trailing zeros ("7.5").
#[must_use]
pub fn format_hours(hours: f64) -> String {
    let text = format!("{hours:.5}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Round half-up to a multiple of `precision` hours.
#[allow(clippy::cast_precision_loss)]
fn round_to_precision(effective: Duration, precision: f64) -> f64 {
    let ms = effective.num_milliseconds() as f64;
    let units = (ms / precision / MS_PER_HOUR + 0.5).floor();
    units * precision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WeekRule;
    use chrono::FixedOffset;

    const EPS: f64 = 1e-9;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        // 2024-03-04 is a Monday
        Utc.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap()
    }

    fn calc(precision: f64, exclude_lunch: bool) -> WorkHours<Utc> {
        let config = WorkHoursConfig {
            precision_hours: precision,
            exclude_lunch,
            ..WorkHoursConfig::default()
        };
        WorkHours::new(config, Calendar::new(Utc, WeekRule::ISO)).unwrap()
    }

    fn assert_hours(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < EPS, "{actual} != {expected}");
    }

    #[test]
    fn test_working_day_with_lunch() {
        let hours = calc(0.25, true).hours(&at(4, 9, 0), &at(4, 17, 0));
        assert_hours(hours, 7.0);
    }

    #[test]
    fn test_without_lunch_is_plain_rounding() {
        let calc = calc(0.1, false);
        for (start, end) in [
            (at(4, 9, 0), at(4, 17, 0)),
            (at(4, 9, 7), at(4, 9, 50)),
            (at(4, 11, 0), at(5, 13, 13)),
        ] {
            let ms = (end - start).num_milliseconds() as f64;
            let expected = ((ms / 3_600_000.0) / 0.1 + 0.5).floor() * 0.1;
            assert_hours(calc.hours(&start, &end), expected);
        }
    }

    #[test]
    fn test_two_midnights_subtract_each_lunch() {
        let calc = calc(0.25, true);
        // Monday 10:00 to Wednesday 14:00 crosses three lunch windows
        assert_hours(calc.hours(&at(4, 10, 0), &at(6, 14, 0)), 49.0);
        // Ending Wednesday 11:00 leaves Wednesday's window untouched
        assert_hours(calc.hours(&at(4, 10, 0), &at(6, 11, 0)), 47.0);
    }

    #[test]
    fn test_lunch_walk_stops_at_first_day_without_overlap() {
        let calc = calc(0.25, true);
        // Monday 13:00 misses Monday's window, so Tuesday's is never reached
        assert_eq!(calc.lunch_overlap(&at(4, 13, 0), &at(5, 13, 0)), Duration::zero());
        assert_hours(calc.hours(&at(4, 13, 0), &at(5, 13, 0)), 24.0);
    }

    #[test]
    fn test_inverted_lunch_window_excludes_nothing() {
        let config = WorkHoursConfig {
            precision_hours: 0.25,
            exclude_lunch: true,
            lunch_start_minutes: 13 * 60,
            lunch_end_minutes: 12 * 60,
        };
        let calendar = Calendar::new(Utc, WeekRule::ISO);
        let hours = work_hours(&at(4, 9, 0), &at(4, 17, 0), &config, &calendar).unwrap();
        assert_hours(hours, 8.0);
    }

    #[test]
    fn test_partial_lunch_overlap() {
        let calc = calc(0.25, true);
        assert_eq!(
            calc.lunch_overlap(&at(4, 12, 0), &at(4, 15, 0)),
            Duration::minutes(30)
        );
        assert_hours(calc.hours(&at(4, 12, 0), &at(4, 15, 0)), 2.5);
    }

    #[test]
    fn test_session_inside_lunch_is_zero() {
        let hours = calc(0.1, true).hours(&at(4, 11, 45), &at(4, 12, 15));
        assert_hours(hours, 0.0);
    }

    #[test]
    fn test_empty_and_backwards_sessions() {
        for exclude in [false, true] {
            let calc = calc(0.5, exclude);
            assert_hours(calc.hours(&at(4, 9, 0), &at(4, 9, 0)), 0.0);
            assert_hours(calc.hours(&at(4, 12, 0), &at(4, 9, 0)), 0.0);
        }
    }

    #[test]
    fn test_half_precision_rounds_up() {
        assert_hours(calc(1.0, false).hours(&at(4, 9, 0), &at(4, 9, 30)), 1.0);
        assert_hours(calc(1.0, false).hours(&at(4, 9, 0), &at(4, 9, 29)), 0.0);
    }

    #[test]
    fn test_lunch_in_local_time() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let config = WorkHoursConfig {
            precision_hours: 0.25,
            exclude_lunch: true,
            ..WorkHoursConfig::default()
        };
        let calc = WorkHours::new(config, Calendar::new(tz, WeekRule::ISO)).unwrap();
        // 09:00 to 17:00 at +02:00
        assert_hours(calc.hours(&at(4, 7, 0), &at(4, 15, 0)), 7.0);
    }

    #[test]
    fn test_running_session_counts_to_now() {
        let session = Session {
            id: 1,
            project_id: 1,
            start: at(4, 9, 0),
            end: None,
            comment: None,
        };
        assert_hours(calc(0.25, false).session_hours(&session, at(4, 10, 30)), 1.5);
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(7.0), "7");
        assert_eq!(format_hours(0.1 + 0.2), "0.3");
        assert_eq!(format_hours(2.25), "2.25");
        assert_eq!(format_hours(0.0), "0");
    }

    #[test]
    fn test_work_hours_rejects_bad_precision() {
        let config = WorkHoursConfig {
            precision_hours: 0.0,
            ..WorkHoursConfig::default()
        };
        let calendar = Calendar::new(Utc, WeekRule::ISO);
        let err = work_hours(&at(4, 9, 0), &at(4, 10, 0), &config, &calendar).unwrap_err();
        assert!(matches!(err, WorktimeError::InvalidConfig(_)));

        let ok = work_hours(
            &at(4, 9, 0),
            &at(4, 10, 0),
            &WorkHoursConfig::default(),
            &calendar,
        )
        .unwrap();
        assert_hours(ok, 1.0);
    }
}
