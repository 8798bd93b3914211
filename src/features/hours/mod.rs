//! The work-hours aggregation engine.
//!
//! [`WorkHours`] turns a session into rounded hours with the lunch window
//! excluded; [`aggregate_totals`] groups sessions into weekly or monthly
//! totals.

mod calculator;
mod config;
mod totals;

pub use calculator::{format_hours, work_hours, WorkHours};
pub use config::WorkHoursConfig;
pub use totals::{aggregate_totals, PeriodKey, PeriodKind, PeriodTotal, PeriodTotals};
