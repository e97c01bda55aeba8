// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod launch;
pub mod logging;
pub mod server;
pub mod trigger;
pub mod types;

use std::path::Path;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate, locate_config};
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config location and loading
/// - logging (level from CLI / env / config)
/// - `--check` mode
/// - the driver in [`server`], which owns the scheduler, the launcher, the
///   spool producer and signal handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = locate_config(args.config.as_deref())?;
    let cfg = load_and_validate(&config_path)?;

    if args.check {
        print_check(&config_path, &cfg);
        return Ok(());
    }

    let log = logging::init_logging(args.log_level, cfg.daemon.log_level)?;
    debug!(config = ?config_path, "configuration loaded");

    server::serve(&args, cfg, log).await
}

/// Simple `--check` output: print the effective configuration.
fn print_check(config_path: &Path, cfg: &ConfigFile) {
    println!("backblast config check: {}", config_path.display());
    println!(
        "  backblast.log_level = {}",
        cfg.daemon
            .log_level
            .map(|l| l.as_directive())
            .unwrap_or("(default)")
    );
    if let Some(ref pid_file) = cfg.daemon.pid_file {
        println!("  backblast.pid_file = {}", pid_file.display());
    }
    match cfg.scheduler.dispatch_timeout {
        Some(timeout) => println!("  scheduler.dispatch_timeout = {:?}", timeout),
        None => println!("  scheduler.dispatch_timeout = (none)"),
    }
    println!("  launcher.cmd = {}", cfg.launcher.cmd);
    for (key, value) in cfg.launcher.env.iter() {
        println!("  launcher.env.{key} = {value}");
    }
    if let Some(ref spool_dir) = cfg.trigger.spool_dir {
        println!("  trigger.spool_dir = {}", spool_dir.display());
    }
}
