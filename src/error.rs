//! Error types for worktime.

use thiserror::Error;

/// All errors produced by worktime.
#[derive(Debug, Error)]
pub enum WorktimeError {
    /// The session/project store failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The configuration file or paths could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input data violates a precondition (e.g. a running session passed
    /// where only closed sessions are accepted).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The requested project or session does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation would break the single-running-session rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// User input or serialized data could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A backup document is malformed or has the wrong version.
    #[error("Backup error: {0}")]
    Backup(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for WorktimeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("JSON error: {e}"))
    }
}

impl WorktimeError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 2,
            Self::Conflict(_) => 3,
            Self::Config(_) | Self::InvalidConfig(_) => 4,
            _ => 1,
        }
    }
}
