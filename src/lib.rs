//! worktime - project time tracking
//!
//! Sessions are recorded per project in SQLite, turned into work hours
//! (optionally without the lunch break, rounded to a precision) and summed
//! into weekly and monthly totals, reports and XML backups.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod logging;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::WorktimeError;
pub use features::hours::{aggregate_totals, work_hours, WorkHours, WorkHoursConfig};
