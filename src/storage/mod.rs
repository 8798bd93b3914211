//! `SQLite` persistence for projects and sessions.

mod database;
mod migrations;

pub(crate) use database::map_write_error;
pub use database::Database;
