// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::Parser;

use crate::types::LogLevel;

/// Command-line arguments for `backblast`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "backblast",
    version,
    about = "Dispatch queued changes to a launcher, one at a time.",
    long_about = None,
    after_help = "backblast always runs in the foreground and never forks or detaches. \
                  Run it under a supervisor such as systemd; there is no -d flag."
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `/etc/backblast/backblast.toml`.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BACKBLAST_LOG`, then `[backblast].log_level`, then `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Write the daemon PID to this file (overrides `[backblast].pid_file`).
    #[arg(long, value_name = "PATH")]
    pub pid_file: Option<PathBuf>,

    /// Parse + validate the config, print a summary, and exit.
    #[arg(long)]
    pub check: bool,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
