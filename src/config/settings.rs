//! Configuration settings for worktime.
//!
//! Settings are loaded from `~/.worktime/config.yaml`.

use std::path::Path;

use chrono::{TimeZone, Weekday};
use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::core::{
    format_minutes_of_day, parse_minutes_of_day, parse_precision, parse_weekday, weekday_name,
    Calendar, WeekRule,
};
use crate::error::WorktimeError;
use crate::features::hours::{WorkHours, WorkHoursConfig};
use crate::features::report::{ReportOptions, ReportPeriod};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Work-hours calculation.
    pub hours: HoursConfig,
    /// Week numbering.
    pub calendar: CalendarConfig,
    /// Report defaults.
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Work-hours settings as written in the file.
///
/// Times of day are strings ("11:30") and the precision may be written
/// with a decimal comma; [`Config::work_hours`] turns them into a
/// validated [`WorkHoursConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoursConfig {
    /// Rounding granularity in hours.
    #[serde(default = "default_precision")]
    pub precision: Precision,
    /// Subtract the daily lunch window.
    #[serde(default)]
    pub exclude_lunch: bool,
    #[serde(default = "default_lunch_start")]
    pub lunch_start: String,
    #[serde(default = "default_lunch_end")]
    pub lunch_end: String,
}

/// A precision written either as a number or as a string like "0,25".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Precision {
    Number(f64),
    Text(String),
}

impl Precision {
    /// The precision in hours, if it parses as a positive number.
    #[must_use]
    pub fn hours(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() && *n > 0.0 => Some(*n),
            Self::Number(_) => None,
            Self::Text(text) => parse_precision(text),
        }
    }
}

/// Week numbering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    #[serde(default = "default_first_day", with = "weekday_name")]
    pub first_day_of_week: Weekday,
    /// Days of the new year the first week must contain (1-7).
    #[serde(default = "default_min_days")]
    pub min_days_in_first_week: u32,
}

/// Report defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default = "default_true")]
    pub include_week_totals: bool,
    #[serde(default = "default_true")]
    pub include_month_totals: bool,
    #[serde(default = "default_true")]
    pub group_by_day: bool,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

const fn default_precision() -> Precision {
    Precision::Number(0.1)
}

fn default_lunch_start() -> String {
    "11:30".to_string()
}

fn default_lunch_end() -> String {
    "12:30".to_string()
}

const fn default_first_day() -> Weekday {
    Weekday::Mon
}

const fn default_min_days() -> u32 {
    4
}

const fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            exclude_lunch: false,
            lunch_start: default_lunch_start(),
            lunch_end: default_lunch_end(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            first_day_of_week: default_first_day(),
            min_days_in_first_week: default_min_days(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            period: ReportPeriod::default(),
            include_week_totals: default_true(),
            include_month_totals: default_true(),
            group_by_day: default_true(),
        }
    }
}

/// Keys accepted by [`Config::set`].
pub const SETTABLE_KEYS: &[&str] = &[
    "general.default_output",
    "general.color",
    "hours.precision",
    "hours.exclude_lunch",
    "hours.lunch_start",
    "hours.lunch_end",
    "calendar.first_day_of_week",
    "calendar.min_days_in_first_week",
    "report.period",
    "report.include_week_totals",
    "report.include_month_totals",
    "report.group_by_day",
];

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, WorktimeError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, WorktimeError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            WorktimeError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            WorktimeError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<(), WorktimeError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.config_file)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<(), WorktimeError> {
        let contents = self.to_yaml()?;

        std::fs::write(path, contents).map_err(|e| {
            WorktimeError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// The configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, WorktimeError> {
        serde_yaml::to_string(self)
            .map_err(|e| WorktimeError::Config(format!("Failed to serialize config: {e}")))
    }

    /// The validated work-hours settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unparsable precision or lunch time, or
    /// values out of range.
    pub fn work_hours(&self) -> Result<WorkHoursConfig, WorktimeError> {
        let precision_hours = self.hours.precision.hours().ok_or_else(|| {
            WorktimeError::InvalidConfig(format!(
                "hours.precision must be a positive number, got {:?}",
                self.hours.precision
            ))
        })?;

        let config = WorkHoursConfig {
            precision_hours,
            exclude_lunch: self.hours.exclude_lunch,
            lunch_start_minutes: time_setting("hours.lunch_start", &self.hours.lunch_start)?,
            lunch_end_minutes: time_setting("hours.lunch_end", &self.hours.lunch_end)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// The week numbering rule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `min_days_in_first_week` is not 1-7.
    pub fn week_rule(&self) -> Result<WeekRule, WorktimeError> {
        WeekRule::new(
            self.calendar.first_day_of_week,
            self.calendar.min_days_in_first_week,
        )
    }

    /// A calendar in `tz` using the configured week rule.
    ///
    /// # Errors
    ///
    /// See [`Config::week_rule`].
    pub fn calendar<Tz: TimeZone>(&self, tz: Tz) -> Result<Calendar<Tz>, WorktimeError> {
        Ok(Calendar::new(tz, self.week_rule()?))
    }

    /// The work-hours engine for `tz`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any hours or calendar setting is invalid.
    pub fn hours_engine<Tz: TimeZone>(&self, tz: Tz) -> Result<WorkHours<Tz>, WorktimeError> {
        WorkHours::new(self.work_hours()?, self.calendar(tz)?)
    }

    /// Report defaults.
    #[must_use]
    pub const fn report_options(&self) -> ReportOptions {
        ReportOptions {
            period: self.report.period,
            week_totals: self.report.include_week_totals,
            month_totals: self.report.include_month_totals,
            group_by_day: self.report.group_by_day,
        }
    }

    /// Check every setting.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidConfig` found.
    pub fn validate(&self) -> Result<(), WorktimeError> {
        self.work_hours()?;
        self.week_rule()?;
        Ok(())
    }

    /// Set a single value by its dotted key (see [`SETTABLE_KEYS`]).
    ///
    /// The configuration is left unchanged if the result would be invalid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unknown key or a bad value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), WorktimeError> {
        let mut next = self.clone();
        let value = value.trim();

        match key {
            "general.default_output" => {
                next.general.default_output = match value.to_lowercase().as_str() {
                    "pretty" => OutputFormat::Pretty,
                    "json" => OutputFormat::Json,
                    _ => return Err(bad_value(key, value, "pretty or json")),
                };
            }
            "general.color" => {
                next.general.color = match value.to_lowercase().as_str() {
                    "auto" => ColorSetting::Auto,
                    "always" => ColorSetting::Always,
                    "never" => ColorSetting::Never,
                    _ => return Err(bad_value(key, value, "auto, always or never")),
                };
            }
            "hours.precision" => {
                parse_precision(value)
                    .ok_or_else(|| bad_value(key, value, "a positive number of hours"))?;
                next.hours.precision = Precision::Text(value.to_string());
            }
            "hours.exclude_lunch" => next.hours.exclude_lunch = parse_bool(key, value)?,
            "hours.lunch_start" => {
                let minutes = time_setting(key, value)?;
                next.hours.lunch_start = format_minutes_of_day(minutes);
            }
            "hours.lunch_end" => {
                let minutes = time_setting(key, value)?;
                next.hours.lunch_end = format_minutes_of_day(minutes);
            }
            "calendar.first_day_of_week" => {
                next.calendar.first_day_of_week = parse_weekday(value)
                    .ok_or_else(|| bad_value(key, value, "a day name such as monday"))?;
            }
            "calendar.min_days_in_first_week" => {
                next.calendar.min_days_in_first_week = value
                    .parse()
                    .map_err(|_| bad_value(key, value, "a number from 1 to 7"))?;
            }
            "report.period" => {
                next.report.period = ReportPeriod::parse(value).ok_or_else(|| {
                    bad_value(key, value, "this-month, last-month, this-week, last-week or all")
                })?;
            }
            "report.include_week_totals" => next.report.include_week_totals = parse_bool(key, value)?,
            "report.include_month_totals" => {
                next.report.include_month_totals = parse_bool(key, value)?;
            }
            "report.group_by_day" => next.report.group_by_day = parse_bool(key, value)?,
            _ => {
                return Err(WorktimeError::InvalidConfig(format!(
                    "unknown setting '{key}', expected one of: {}",
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }

        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn time_setting(key: &str, value: &str) -> Result<u32, WorktimeError> {
    parse_minutes_of_day(value).ok_or_else(|| bad_value(key, value, "a time such as 11:30"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, WorktimeError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(bad_value(key, value, "true or false")),
    }
}

fn bad_value(key: &str, value: &str, expected: &str) -> WorktimeError {
    WorktimeError::InvalidConfig(format!("{key}: '{value}' is not valid, expected {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert_eq!(config.work_hours().unwrap(), WorkHoursConfig::default());
        assert_eq!(config.week_rule().unwrap(), WeekRule::ISO);
        assert_eq!(config.report_options(), ReportOptions::default());
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();

        // Should return defaults when file doesn't exist
        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert!(!config.hours.exclude_lunch);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.set("hours.precision", "0,25").unwrap();
        config.set("hours.exclude_lunch", "yes").unwrap();
        config.set("calendar.first_day_of_week", "sun").unwrap();
        config.set("calendar.min_days_in_first_week", "1").unwrap();

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        let hours = loaded.work_hours().unwrap();

        assert!((hours.precision_hours - 0.25).abs() < f64::EPSILON);
        assert!(hours.exclude_lunch);
        assert_eq!(loaded.week_rule().unwrap(), WeekRule::US);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        // Write a partial config (only some fields)
        let partial_yaml = r#"
hours:
  exclude_lunch: true
  lunch_start: "12:00"
report:
  period: last-week
"#;
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        let hours = config.work_hours().unwrap();

        assert!(hours.exclude_lunch);
        assert_eq!(hours.lunch_start_minutes, 12 * 60);
        // Defaults should be used for missing fields
        assert_eq!(hours.lunch_end_minutes, 12 * 60 + 30);
        assert!((hours.precision_hours - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.report.period, ReportPeriod::LastWeek);
        assert!(config.report.group_by_day);
    }

    #[test]
    fn test_precision_with_decimal_comma_in_file() {
        let config: Config = serde_yaml::from_str("hours:\n  precision: \"0,5\"\n").unwrap();
        assert!((config.work_hours().unwrap().precision_hours - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config: Config = serde_yaml::from_str("hours:\n  precision: 0\n").unwrap();
        assert!(matches!(
            config.work_hours().unwrap_err(),
            WorktimeError::InvalidConfig(_)
        ));

        let config: Config =
            serde_yaml::from_str("hours:\n  lunch_start: \"13:00\"\n  lunch_end: \"12:00\"\n")
                .unwrap();
        assert!(config.validate().is_ok());

        let config: Config = serde_yaml::from_str("hours:\n  lunch_start: \"24:30\"\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config =
            serde_yaml::from_str("calendar:\n  min_days_in_first_week: 9\n").unwrap();
        assert!(config.week_rule().is_err());
    }

    #[test]
    fn test_set_rejects_without_changing() {
        let mut config = Config::default();

        assert!(config.set("hours.precision", "-1").is_err());
        assert!(config.set("hours.lunch_end", "25:00").is_err());
        assert!(config.set("calendar.min_days_in_first_week", "0").is_err());
        assert!(config.set("no.such.key", "1").is_err());

        assert_eq!(config.work_hours().unwrap(), WorkHoursConfig::default());
        assert_eq!(config.calendar.min_days_in_first_week, 4);
    }

    #[test]
    fn test_set_normalises_times_and_formats() {
        let mut config = Config::default();
        config.set("hours.lunch_start", "12.15").unwrap();
        config.set("hours.lunch_end", "13:00").unwrap();
        config.set("general.default_output", "JSON").unwrap();
        config.set("report.group_by_day", "off").unwrap();

        assert_eq!(config.hours.lunch_start, "12:15");
        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert!(!config.report_options().group_by_day);
    }

    #[test]
    fn test_calendar_uses_rule() {
        let mut config = Config::default();
        config.set("calendar.first_day_of_week", "sunday").unwrap();
        let calendar = config.calendar(Utc).unwrap();
        assert_eq!(calendar.rule().first_day(), Weekday::Sun);
        assert!(config.hours_engine(Utc).is_ok());
    }
}
