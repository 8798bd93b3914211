//! Core calendar and parsing utilities shared by the features.

mod calendar;
mod datetime;

pub use calendar::{parse_weekday, weekday_name, Calendar, MonthKey, WeekKey, WeekRule};
pub use datetime::{
    format_minutes_of_day, parse_date, parse_date_time, parse_minutes_of_day, parse_precision,
    parse_time_of_day,
};
