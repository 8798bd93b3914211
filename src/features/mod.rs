//! Feature implementations for worktime.
//!
//! - Work-hours calculation and period totals
//! - Projects and sessions
//! - Reports
//! - Backups

pub mod backup;
pub mod hours;
pub mod projects;
pub mod report;
pub mod sessions;
