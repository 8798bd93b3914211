use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::features::hours::PeriodKind;
use crate::features::report::ReportFormat;

#[derive(Parser)]
#[command(name = "worktime")]
#[command(about = "Track time per project and total it into work hours")]
#[command(long_about = "worktime - project time tracking

Start and stop sessions per project, then turn them into work hours with
an optional lunch break deducted and rounding to a fixed precision.
Sessions are totalled per week and per month, and reports can be shared
as text or HTML.

QUICK START:
  worktime project add Acme          Create a project
  worktime start Acme                Start working on it
  worktime stop --comment \"setup\"    Stop the running session
  worktime report Acme               This month's hours for Acme

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  worktime <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output. Defaults to `general.default_output` from
    /// the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Log to stderr as well as the log file (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects
    ///
    /// # Examples
    ///
    ///   worktime project list
    ///   worktime project add "Acme Corp"
    ///   worktime project rename 3 "Acme"
    ///   worktime project delete Acme --yes
    #[command(alias = "p")]
    Project(ProjectArgs),

    /// Start a session now (or at --at) for a project
    ///
    /// Fails if a session is already running.
    ///
    /// # Examples
    ///
    ///   worktime start Acme
    ///   worktime start 3 --at 8:45 --comment "standup"
    Start {
        /// Project id or name
        project: String,

        /// Start time ("9:30", "yesterday 17:00", "2024-03-04 09:00")
        #[arg(long)]
        at: Option<String>,

        /// Comment for the session
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Stop the running session
    ///
    /// # Examples
    ///
    ///   worktime stop
    ///   worktime stop --at 17:30 --comment "release notes"
    Stop {
        /// End time (defaults to now)
        #[arg(long)]
        at: Option<String>,

        /// Replace the session's comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Show the running session and its hours so far
    #[command(alias = "st")]
    Status,

    /// List, add, edit and delete sessions
    ///
    /// # Examples
    ///
    ///   worktime session list Acme --from monday
    ///   worktime session add Acme --start "yesterday 9:00" --end "yesterday 17:00"
    ///   worktime session edit 12 --end 18:00
    ///   worktime session delete 12
    #[command(alias = "s")]
    Session(SessionArgs),

    /// Weekly or monthly work-hour totals of a project
    ///
    /// # Examples
    ///
    ///   worktime totals Acme
    ///   worktime totals Acme --by month
    Totals {
        /// Project id or name
        project: String,

        /// Period to total by
        #[arg(long, value_enum, default_value = "week")]
        by: PeriodKind,
    },

    /// Build a shareable report of a project's hours
    ///
    /// Periods: this-month, last-month, this-week, last-week, all. Use
    /// --from/--to for a custom range (both inclusive).
    ///
    /// # Examples
    ///
    ///   worktime report Acme
    ///   worktime report Acme --period last-month --format html --file march.html
    ///   worktime report Acme --from 2024-01-01 --to 2024-03-31 --no-week-totals
    #[command(alias = "r")]
    Report(ReportArgs),

    /// Export or import an XML backup of all projects and sessions
    ///
    /// # Examples
    ///
    ///   worktime backup export
    ///   worktime backup export --file ~/worktime.xml
    ///   worktime backup import ~/worktime.xml
    Backup(BackupArgs),

    /// Show and change settings
    ///
    /// # Examples
    ///
    ///   worktime config show
    ///   worktime config set hours.exclude_lunch true
    ///   worktime config set hours.precision 0,25
    Config(ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// # Examples
    ///
    ///   worktime completions bash > ~/.bash_completion.d/worktime
    ///   worktime completions zsh > ~/.zfunc/_worktime
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects with session counts and hours
    #[command(alias = "ls")]
    List,

    /// Create a project
    Add {
        /// Project name
        name: String,
    },

    /// Rename a project
    Rename {
        /// Project id or name
        project: String,

        /// New name
        name: String,
    },

    /// Delete a project and all of its sessions
    #[command(alias = "rm")]
    Delete {
        /// Project id or name
        project: String,

        /// Required confirmation, since sessions are deleted too
        #[arg(long, visible_alias = "force")]
        yes: bool,
    },
}

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// List a project's sessions with week and month totals
    #[command(alias = "ls")]
    List {
        /// Project id or name
        project: String,

        /// First day to include ("monday", "2024-03-01", "7 days ago")
        #[arg(long)]
        from: Option<String>,

        /// Last day to include
        #[arg(long)]
        to: Option<String>,

        /// Show at most this many sessions (the most recent ones)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Record a session after the fact
    Add {
        /// Project id or name
        project: String,

        /// Start time
        #[arg(long)]
        start: String,

        /// End time; omit to add a running session
        #[arg(long)]
        end: Option<String>,

        /// Comment for the session
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Change a session
    Edit {
        /// Session id
        id: i64,

        /// New start time
        #[arg(long)]
        start: Option<String>,

        /// New end time
        #[arg(long, conflicts_with = "running")]
        end: Option<String>,

        /// Reopen the session (clear its end)
        #[arg(long)]
        running: bool,

        /// New comment; an empty string clears it
        #[arg(short, long)]
        comment: Option<String>,

        /// Move the session to another project
        #[arg(long)]
        project: Option<String>,
    },

    /// Delete a session
    #[command(alias = "rm")]
    Delete {
        /// Session id
        id: i64,
    },

    /// Show one session
    Show {
        /// Session id
        id: i64,
    },
}

#[derive(Args)]
pub struct ReportArgs {
    /// Project id or name
    pub project: String,

    /// Period to report (defaults to `report.period` from the config file)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub period: Option<String>,

    /// First day of a custom range
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last day of a custom range
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Leave out weekly totals
    #[arg(long)]
    pub no_week_totals: bool,

    /// Leave out monthly totals
    #[arg(long)]
    pub no_month_totals: bool,

    /// One line per session instead of one per day
    #[arg(long)]
    pub no_group_by_day: bool,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommands,
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write all projects and sessions to an XML file
    Export {
        /// Target file (defaults to a dated file in the backups directory)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Add all projects and sessions from an XML backup
    Import {
        /// Backup file
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the paths worktime uses
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Change one setting
    Set {
        /// Dotted key, e.g. hours.precision
        key: String,

        /// New value
        value: String,
    },
}
