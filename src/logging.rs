// src/logging.rs

//! Logging setup for `envlaunch` using `tracing` + `tracing-subscriber`.
//!
//! The level comes from `ENVLAUNCH_LOG` (already parsed into
//! [`LaunchArgs::log_level`](crate::cli::LaunchArgs)), defaulting to `info`.
//!
//! Logs go to STDERR; STDOUT belongs to the setup script and the server.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let level = level.map(level_from_log_level).unwrap_or(tracing::Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}
