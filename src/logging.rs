//! Tracing setup: a daily rolling log file, plus stderr with `-v`.

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_PREFIX: &str = "worktime";

/// Level for a `-v` count; `None` defers to `RUST_LOG`.
#[must_use]
pub const fn verbosity_level(verbosity: u8) -> Option<LevelFilter> {
    match verbosity {
        0 => None,
        1 => Some(LevelFilter::INFO),
        2 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

/// Install the global subscriber writing to `log_dir`.
///
/// The level comes from `verbosity`, then `RUST_LOG`, then `warn`. Events
/// are echoed to stderr only when `verbosity > 0`.
///
/// # Errors
///
/// Fails if the log directory cannot be used or a subscriber is already set.
pub fn enable_logging(log_dir: &Path, verbosity: u8) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(log_dir)?;

    let show_stderr = verbosity > 0;
    let stderr = std::io::stderr.with_filter(move |_| show_stderr);

    let filter = match verbosity_level(verbosity) {
        Some(level) => EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME"))),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", env!("CARGO_PKG_NAME")))),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(stderr.and(appender))
        .try_init()
        .map_err(|e| anyhow!("{e}"))
}
