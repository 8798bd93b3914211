//! Work-hours settings, validated.

use chrono::NaiveTime;
use serde::Serialize;

use crate::error::WorktimeError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// How session durations become work hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkHoursConfig {
    /// Rounding granularity in hours.
    pub precision_hours: f64,
    /// Whether the daily lunch window is subtracted.
    pub exclude_lunch: bool,
    /// Lunch start, minutes after local midnight.
    pub lunch_start_minutes: u32,
    /// Lunch end, minutes after local midnight.
    pub lunch_end_minutes: u32,
}

impl Default for WorkHoursConfig {
    fn default() -> Self {
        Self {
            precision_hours: 0.1,
            exclude_lunch: false,
            lunch_start_minutes: 11 * 60 + 30,
            lunch_end_minutes: 12 * 60 + 30,
        }
    }
}

impl WorkHoursConfig {
    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a precision that is not a positive finite
    /// number or a lunch bound outside the day. A lunch end before its start
    /// is allowed and excludes nothing.
    pub fn validate(&self) -> Result<(), WorktimeError> {
        if !(self.precision_hours.is_finite() && self.precision_hours > 0.0) {
            return Err(WorktimeError::InvalidConfig(format!(
                "precision must be a positive number of hours, got {}",
                self.precision_hours
            )));
        }

        for (label, minutes) in [
            ("lunch start", self.lunch_start_minutes),
            ("lunch end", self.lunch_end_minutes),
        ] {
            if minutes >= MINUTES_PER_DAY {
                return Err(WorktimeError::InvalidConfig(format!(
                    "{label} must be before 24:00, got {minutes} minutes"
                )));
            }
        }

        Ok(())
    }

    /// Lunch window as local times of day.
    #[must_use]
    pub fn lunch_window(&self) -> (NaiveTime, NaiveTime) {
        (to_time(self.lunch_start_minutes), to_time(self.lunch_end_minutes))
    }
}

fn to_time(minutes: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorkHoursConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.lunch_window(),
            (
                NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
                NaiveTime::from_hms_opt(12, 30, 0).unwrap()
            )
        );
    }

    #[test]
    fn test_bad_precision_rejected() {
        for precision in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let config = WorkHoursConfig {
                precision_hours: precision,
                ..WorkHoursConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(WorktimeError::InvalidConfig(_))),
                "{precision}"
            );
        }
    }

    #[test]
    fn test_lunch_bounds() {
        let inverted = WorkHoursConfig {
            lunch_start_minutes: 13 * 60,
            lunch_end_minutes: 12 * 60,
            ..WorkHoursConfig::default()
        };
        assert!(inverted.validate().is_ok());

        let out_of_day = WorkHoursConfig {
            lunch_end_minutes: 24 * 60,
            ..WorkHoursConfig::default()
        };
        assert!(out_of_day.validate().is_err());
    }
}
