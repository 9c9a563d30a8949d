// src/logging.rs

//! Logging setup for `war` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `WAR_LOG` environment variable (e.g. "info", "debug")
//! 2. `debug` when the CLI verbosity is 9 or more
//! 3. default to `info`
//!
//! The verbosity level additionally gates the file-change lines themselves
//! (see [`Verbosity::logs_change`]).
//!
//! Logs are sent to STDERR; the commands' own output goes to STDOUT.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::types::Verbosity;

pub const LOG_ENV: &str = "WAR_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(verbosity: Verbosity) -> Result<()> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| parse_level_str(&s))
        .unwrap_or_else(|| level_for_verbosity(verbosity));

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;

    Ok(())
}

pub fn level_for_verbosity(verbosity: Verbosity) -> tracing::Level {
    if verbosity >= Verbosity::ALL {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    }
}

pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
