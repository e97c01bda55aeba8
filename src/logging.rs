// src/logging.rs

//! Logging setup for `backblast` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `BACKBLAST_LOG` environment variable (e.g. "info", "debug")
//! 3. `[backblast].log_level` from the config file
//! 4. default to `info`
//!
//! The filter sits behind a `reload` layer so a SIGHUP can apply a new
//! `log_level` without restarting. Logs go to STDERR.

use anyhow::anyhow;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::errors::Result;
use crate::types::LogLevel;

pub const LOG_ENV_VAR: &str = "BACKBLAST_LOG";

/// Handle for changing the log level after startup.
#[derive(Clone)]
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    cli_level: Option<LogLevel>,
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle")
            .field("cli_level", &self.cli_level)
            .finish_non_exhaustive()
    }
}

/// Initialise the global logging subscriber.
///
/// Call once at startup.
pub fn init_logging(
    cli_level: Option<LogLevel>,
    config_level: Option<LogLevel>,
) -> Result<LogHandle> {
    let (filter, handle) = filter_layer(cli_level, config_level);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))?;

    Ok(handle)
}

/// The reloadable level filter and its handle, not yet attached to a
/// subscriber.
pub fn filter_layer(
    cli_level: Option<LogLevel>,
    config_level: Option<LogLevel>,
) -> (reload::Layer<EnvFilter, Registry>, LogHandle) {
    let level = resolve_level(cli_level, env_level(), config_level);
    let (filter, handle) = reload::Layer::new(EnvFilter::new(level.as_directive()));

    (
        filter,
        LogHandle {
            filter: handle,
            cli_level,
        },
    )
}

impl LogHandle {
    /// Re-apply the level after a config reload.
    ///
    /// The CLI flag and the environment variable still win over the config.
    pub fn apply_config_level(&self, config_level: Option<LogLevel>) -> Result<LogLevel> {
        let level = resolve_level(self.cli_level, env_level(), config_level);
        self.filter
            .reload(EnvFilter::new(level.as_directive()))
            .map_err(|e| anyhow!("reloading log filter: {e}"))?;
        Ok(level)
    }

    /// The active filter directive, or `None` once the subscriber is gone.
    pub fn current_filter(&self) -> Option<String> {
        self.filter.with_current(|filter| filter.to_string()).ok()
    }
}

pub fn resolve_level(
    cli_level: Option<LogLevel>,
    env_level: Option<LogLevel>,
    config_level: Option<LogLevel>,
) -> LogLevel {
    cli_level
        .or(env_level)
        .or(config_level)
        .unwrap_or_default()
}

fn env_level() -> Option<LogLevel> {
    std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|s| LogLevel::parse(&s))
}
