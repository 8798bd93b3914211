//! Calendar arithmetic for grouping sessions.
//!
//! All functions are pure and operate on immutable values. A [`Calendar`]
//! carries a time zone and a [`WeekRule`]; nothing is mutated between calls,
//! so a single calendar can be shared across threads and iterations.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

use crate::error::WorktimeError;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Identifies one calendar week.
///
/// `year` is the week-based year: the days of a week always share one key,
/// even when the week straddles New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    /// Week-based year.
    pub year: i32,
    /// Week of year, starting at 1.
    pub week: u32,
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Identifies one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year.
    pub year: i32,
    /// Month of year, 1 to 12.
    pub month: u32,
}

impl MonthKey {
    /// Create a key from a date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// English month name ("January").
    #[must_use]
    pub fn name(&self) -> &'static str {
        let index = self.month.clamp(1, 12) as usize - 1;
        MONTH_NAMES[index]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Serde adapter storing a [`Weekday`] by name ("mon", "sunday").
pub mod weekday_name {
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&day.to_string().to_lowercase())
    }

    /// # Errors
    ///
    /// Fails for a string that is not a day name.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_weekday(&name)
            .ok_or_else(|| D::Error::custom(format!("unknown day of week '{name}'")))
    }
}

/// Parse a day name ("monday", "Mon", "sun").
#[must_use]
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.trim().parse().ok()
}

/// How weeks are numbered.
///
/// Week 1 of a year is the first week (starting on `first_day`) that has at
/// least `min_days_in_first_week` days in that year. Monday with 4 days is
/// ISO 8601; Sunday with 1 day is the common US numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRule {
    first_day: Weekday,
    min_days_in_first_week: u32,
}

impl WeekRule {
    /// ISO 8601 week numbering.
    pub const ISO: Self = Self {
        first_day: Weekday::Mon,
        min_days_in_first_week: 4,
    };

    /// Sunday-first weeks where week 1 contains January 1st.
    pub const US: Self = Self {
        first_day: Weekday::Sun,
        min_days_in_first_week: 1,
    };

    /// Create a rule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `min_days_in_first_week` is 1 to 7.
    pub fn new(first_day: Weekday, min_days_in_first_week: u32) -> Result<Self, WorktimeError> {
        if !(1..=7).contains(&min_days_in_first_week) {
            return Err(WorktimeError::InvalidConfig(format!(
                "min_days_in_first_week must be between 1 and 7, got {min_days_in_first_week}"
            )));
        }
        Ok(Self {
            first_day,
            min_days_in_first_week,
        })
    }

    /// First day of the week.
    #[must_use]
    pub const fn first_day(&self) -> Weekday {
        self.first_day
    }

    /// The date on which the week containing `date` starts.
    #[must_use]
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let back = (7 + date.weekday().num_days_from_monday()
            - self.first_day.num_days_from_monday())
            % 7;
        date - Duration::days(i64::from(back))
    }

    /// Start date of week 1 of `year`.
    fn first_week_start(&self, year: i32) -> Option<NaiveDate> {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let start = self.week_start(jan1);
        let days_in_year = 7 - (jan1 - start).num_days();
        if days_in_year >= i64::from(self.min_days_in_first_week) {
            Some(start)
        } else {
            Some(start + Duration::days(7))
        }
    }

    /// Week key of `date`.
    #[must_use]
    pub fn week_key(&self, date: NaiveDate) -> WeekKey {
        let year = date.year();
        let week_number = |week_one: NaiveDate| {
            u32::try_from((date - week_one).num_days() / 7 + 1).unwrap_or(1)
        };

        if let Some(next) = self.first_week_start(year + 1) {
            if date >= next {
                return WeekKey {
                    year: year + 1,
                    week: 1,
                };
            }
        }
        if let Some(this) = self.first_week_start(year) {
            if date >= this {
                return WeekKey {
                    year,
                    week: week_number(this),
                };
            }
        }
        self.first_week_start(year - 1).map_or(WeekKey { year, week: 1 }, |prev| WeekKey {
            year: year - 1,
            week: week_number(prev),
        })
    }
}

impl Default for WeekRule {
    fn default() -> Self {
        Self::ISO
    }
}

/// A time zone plus week numbering rule.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
    rule: WeekRule,
}

impl<Tz: TimeZone> Calendar<Tz> {
    /// Create a calendar.
    #[must_use]
    pub const fn new(tz: Tz, rule: WeekRule) -> Self {
        Self { tz, rule }
    }

    /// The calendar's time zone.
    #[must_use]
    pub const fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// The calendar's week rule.
    #[must_use]
    pub const fn rule(&self) -> WeekRule {
        self.rule
    }

    /// Local date of an instant.
    #[must_use]
    pub fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Instant of a local wall-clock time.
    ///
    /// Ambiguous times (clocks going back) resolve to the earlier instant;
    /// times inside a gap (clocks going forward) resolve to the first valid
    /// minute after the gap.
    #[must_use]
    pub fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        resolve_local(&self.tz, date.and_time(time))
    }

    /// First instant of a local date.
    #[must_use]
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.at_local(date, NaiveTime::MIN)
    }

    /// Week key of an instant.
    #[must_use]
    pub fn week_key(&self, instant: &DateTime<Utc>) -> WeekKey {
        self.rule.week_key(self.local_date(instant))
    }

    /// Month key of an instant.
    #[must_use]
    pub fn month_key(&self, instant: &DateTime<Utc>) -> MonthKey {
        MonthKey::of(self.local_date(instant))
    }

    /// The week containing `instant`, shifted by `offset` weeks.
    ///
    /// Returns `(from, up_to, key)`; `from` is inclusive and `up_to` exclusive.
    #[must_use]
    pub fn week_range(
        &self,
        instant: &DateTime<Utc>,
        offset: i64,
    ) -> (DateTime<Utc>, DateTime<Utc>, WeekKey) {
        let start = self.rule.week_start(self.local_date(instant)) + Duration::weeks(offset);
        let end = start + Duration::days(7);
        (
            self.start_of_day(start),
            self.start_of_day(end),
            self.rule.week_key(start),
        )
    }

    /// The month containing `instant`, shifted by `offset` months.
    ///
    /// Returns `(from, up_to, key)`; `from` is inclusive and `up_to` exclusive.
    #[must_use]
    pub fn month_range(
        &self,
        instant: &DateTime<Utc>,
        offset: i32,
    ) -> (DateTime<Utc>, DateTime<Utc>, MonthKey) {
        let date = self.local_date(instant);
        let first = date.with_day(1).unwrap_or(date);
        let shifted = shift_months(first, offset);
        let next = shift_months(shifted, 1);
        (
            self.start_of_day(shifted),
            self.start_of_day(next),
            MonthKey::of(shifted),
        )
    }
}

fn shift_months(date: NaiveDate, offset: i32) -> NaiveDate {
    let months = Months::new(offset.unsigned_abs());
    let shifted = if offset >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(date)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let mut probe = naive;
            for _ in 0..(24 * 60) {
                probe += Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
            Utc.from_utc_datetime(&naive)
        }
    }
}
