use serde_json::json;

use super::App;
use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::Config;
use crate::error::WorktimeError;
use crate::output::{format_action, format_config, to_json};

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error for an unknown key, an invalid value, or a config file
/// that cannot be written.
pub fn config(app: &App, command: ConfigCommands) -> Result<String, WorktimeError> {
    let paths = &app.paths;

    match command {
        ConfigCommands::Show => format_config(&app.config, app.format),

        ConfigCommands::Path => match app.format {
            OutputFormat::Json => to_json(&json!({
                "root": paths.root,
                "config": paths.config_file,
                "database": paths.database,
                "logs": paths.logs,
                "backups": paths.backups,
            })),
            OutputFormat::Pretty => Ok(format!(
                "config:   {}\ndatabase: {}\nlogs:     {}\nbackups:  {}",
                paths.config_file.display(),
                paths.database.display(),
                paths.logs.display(),
                paths.backups.display()
            )),
        },

        ConfigCommands::Init { force } => {
            if paths.config_file.exists() && !force {
                return Err(WorktimeError::Config(format!(
                    "{} already exists; pass --force to overwrite it",
                    paths.config_file.display()
                )));
            }
            paths.ensure_dirs()?;
            Config::default().save_to_path(&paths.config_file)?;
            format_action(
                &format!("Wrote default settings to {}", paths.config_file.display()),
                &json!({ "file": paths.config_file }),
                app.format,
            )
        }

        ConfigCommands::Set { key, value } => {
            let mut config = app.config.clone();
            config.set(&key, &value)?;
            paths.ensure_dirs()?;
            config.save_to_path(&paths.config_file)?;
            format_action(
                &format!("Set {key} = {value}"),
                &json!({ "key": key, "value": value }),
                app.format,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::app;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let (_dir, app) = app(OutputFormat::Pretty);
        config(&app, ConfigCommands::Init { force: false }).unwrap();
        assert!(app.paths.config_file.exists());

        let err = config(&app, ConfigCommands::Init { force: false }).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        config(&app, ConfigCommands::Init { force: true }).unwrap();
    }

    #[test]
    fn test_set_persists() {
        let (_dir, app) = app(OutputFormat::Pretty);
        config(
            &app,
            ConfigCommands::Set {
                key: "hours.exclude_lunch".into(),
                value: "true".into(),
            },
        )
        .unwrap();

        let saved = Config::load_from_path(&app.paths.config_file).unwrap();
        assert!(saved.hours.exclude_lunch);

        let err = config(
            &app,
            ConfigCommands::Set {
                key: "hours.precision".into(),
                value: "none".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, WorktimeError::InvalidConfig(_)));
    }

    #[test]
    fn test_show_is_yaml() {
        let (_dir, app) = app(OutputFormat::Pretty);
        let shown = config(&app, ConfigCommands::Show).unwrap();
        assert!(shown.contains("hours:"));
        assert!(shown.contains("lunch_start"));
    }
}
