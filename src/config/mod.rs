//! Configuration management for worktime.
//!
//! This module handles loading and saving configuration from `~/.worktime/`.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{
    CalendarConfig, ColorSetting, Config, GeneralConfig, HoursConfig, Precision, ReportConfig,
    SETTABLE_KEYS,
};
