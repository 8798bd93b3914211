//! Report periods.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Calendar;

/// Which sessions a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportPeriod {
    #[default]
    ThisMonth,
    LastMonth,
    ThisWeek,
    LastWeek,
    All,
    /// Inclusive local date range.
    Custom(NaiveDate, NaiveDate),
}

/// A period resolved against a calendar and a moment.
///
/// `from` is inclusive and `up_to` exclusive; `None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRange {
    pub label: String,
    pub from: Option<DateTime<Utc>>,
    pub up_to: Option<DateTime<Utc>>,
}

impl PeriodRange {
    /// Whether `instant` falls inside the range.
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| *instant >= from)
            && self.up_to.map_or(true, |up_to| *instant < up_to)
    }
}

impl ReportPeriod {
    /// Parse a period name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "this-month" | "month" | "m" => Some(Self::ThisMonth),
            "last-month" | "lm" => Some(Self::LastMonth),
            "this-week" | "week" | "w" => Some(Self::ThisWeek),
            "last-week" | "lw" => Some(Self::LastWeek),
            "all" | "all-time" => Some(Self::All),
            _ => None,
        }
    }

    /// Name as written in config and on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::ThisWeek => "this-week",
            Self::LastWeek => "last-week",
            Self::All => "all",
            Self::Custom(..) => "custom",
        }
    }

    /// Resolve the period's bounds and label at `now`.
    #[must_use]
    pub fn range<Tz: TimeZone>(&self, calendar: &Calendar<Tz>, now: &DateTime<Utc>) -> PeriodRange {
        match self {
            Self::ThisMonth | Self::LastMonth => {
                let offset = if *self == Self::ThisMonth { 0 } else { -1 };
                let (from, up_to, key) = calendar.month_range(now, offset);
                let prefix = if offset == 0 { "This month" } else { "Last month" };
                PeriodRange {
                    label: format!("{prefix} ({})", key.name()),
                    from: Some(from),
                    up_to: Some(up_to),
                }
            }
            Self::ThisWeek | Self::LastWeek => {
                let offset = if *self == Self::ThisWeek { 0 } else { -1 };
                let (from, up_to, key) = calendar.week_range(now, offset);
                let prefix = if offset == 0 { "This week" } else { "Last week" };
                PeriodRange {
                    label: format!("{prefix} ({})", key.week),
                    from: Some(from),
                    up_to: Some(up_to),
                }
            }
            Self::All => PeriodRange {
                label: "All sessions".to_string(),
                from: None,
                up_to: None,
            },
            Self::Custom(first, last) => PeriodRange {
                label: format!("{first} to {last}"),
                from: Some(calendar.start_of_day(*first)),
                up_to: Some(calendar.start_of_day(*last + Duration::days(1))),
            },
        }
    }
}
