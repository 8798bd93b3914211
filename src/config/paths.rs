//! Path resolution for worktime configuration and data files.
//!
//! All data is stored in `~/.worktime/` (or `$WORKTIME_HOME` when set):
//! - `config.yaml` - settings
//! - `worktime.db` - SQLite database with projects and sessions
//! - `logs/` - daily rolling log files
//! - `backups/` - default target for `backup export`

use std::path::PathBuf;

use crate::error::WorktimeError;

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "WORKTIME_HOME";

/// Paths to worktime configuration and data.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.worktime/`
    pub root: PathBuf,
    /// Config file: `~/.worktime/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.worktime/worktime.db`
    pub database: PathBuf,
    /// Log directory: `~/.worktime/logs/`
    pub logs: PathBuf,
    /// Backup directory: `~/.worktime/backups/`
    pub backups: PathBuf,
}

impl Paths {
    /// Resolve paths from `$WORKTIME_HOME`, falling back to `$HOME/.worktime`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, WorktimeError> {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            WorktimeError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".worktime")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("worktime.db"),
            logs: root.join("logs"),
            backups: root.join("backups"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), WorktimeError> {
        for dir in [&self.root, &self.logs, &self.backups] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    WorktimeError::Config(format!(
                        "Failed to create directory {}: {e}",
                        dir.display()
                    ))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-worktime");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("worktime.db"));
        assert_eq!(paths.logs, root.join("logs"));
        assert_eq!(paths.backups, root.join("backups"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
        assert!(paths.logs.exists());
        assert!(paths.backups.exists());
    }
}
