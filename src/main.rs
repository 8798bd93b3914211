use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use worktime::cli::args::{Cli, Commands};
use worktime::cli::commands::{self, App};
use worktime::config::{ColorSetting, Config, Paths};
use worktime::error::WorktimeError;
use worktime::logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        let code = e
            .downcast_ref::<WorktimeError>()
            .map_or(1, WorktimeError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;

    let config = match Config::load_from_path(&paths.config_file) {
        Ok(config) => config,
        // Keep `config init --force` and friends usable with a broken file
        Err(e) if matches!(cli.command, Commands::Config(_)) => {
            eprintln!("{}: {e}; using defaults", "warning".yellow().bold());
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    if !matches!(cli.command, Commands::Completions { .. }) {
        paths.ensure_dirs()?;
        if let Err(e) = logging::enable_logging(&paths.logs, cli.verbose) {
            eprintln!("{}: logging disabled: {e}", "warning".yellow().bold());
        }
    }

    let format = cli.output.unwrap_or(config.general.default_output);
    let app = App::new(paths, config, format);

    let output = match cli.command {
        Commands::Project(args) => commands::project(&app, args.command)?,
        Commands::Start {
            project,
            at,
            comment,
        } => commands::start(&app, &project, at.as_deref(), comment)?,
        Commands::Stop { at, comment } => commands::stop(&app, at.as_deref(), comment)?,
        Commands::Status => commands::status(&app)?,
        Commands::Session(args) => commands::session(&app, args.command)?,
        Commands::Totals { project, by } => commands::totals(&app, &project, by)?,
        Commands::Report(args) => commands::report(&app, args)?,
        Commands::Backup(args) => commands::backup(&app, args.command)?,
        Commands::Config(args) => commands::config(&app, args.command)?,
        Commands::Completions { shell } => commands::completions(shell),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
