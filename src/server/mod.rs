// src/server/mod.rs

//! The driver: wires config, logging, PID file, launcher, producers and OS
//! signals around one [`Scheduler`].
//!
//! Startup order matters: the worker is started and configured
//! (`reconfigure`) before it is resumed, and signals are only wired once the
//! first configuration is in effect.

pub mod pidfile;
pub mod signals;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate, locate_config};
use crate::engine::{ExitAction, Scheduler, SchedulerOptions};
use crate::errors::Result;
use crate::launch::CommandLauncher;
use crate::logging::LogHandle;
use crate::trigger::spawn_spool_watcher;

pub use pidfile::PidFile;
pub use signals::{ReloadSlot, serve_signals};

/// State the signal handlers need.
#[derive(Debug, Clone)]
pub struct Server {
    explicit_config: Option<PathBuf>,
    log: LogHandle,
    scheduler: Scheduler,
    startup: Arc<ConfigFile>,
}

impl Server {
    pub fn new(
        explicit_config: Option<PathBuf>,
        log: LogHandle,
        scheduler: Scheduler,
        startup: ConfigFile,
    ) -> Self {
        Self {
            explicit_config,
            log,
            scheduler,
            startup: Arc::new(startup),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run [`Server::reload`] on its own task so signal handling stays
    /// responsive while `reconfigure` waits for the worker.
    pub fn spawn_reload(&self) -> JoinHandle<()> {
        let server = self.clone();

        tokio::spawn(async move {
            if let Err(err) = server.reload().await {
                error!(error = %err, "reload failed; keeping current configuration");
            }
        })
    }

    /// Re-read the config file, apply its log level and hand it to the
    /// scheduler.
    ///
    /// On error nothing has been applied and the active configuration stays.
    pub async fn reload(&self) -> Result<()> {
        let config_path = locate_config(self.explicit_config.as_deref())?;
        let cfg = load_and_validate(&config_path)?;
        debug!(config = ?config_path, "re-read configuration");

        match self.log.apply_config_level(cfg.daemon.log_level) {
            Ok(level) => debug!(?level, "log level applied"),
            Err(err) => warn!(error = %err, "failed to apply log level"),
        }
        for field in restart_only_changes(&self.startup, &cfg) {
            warn!(field, "setting changed; takes effect after restart");
        }

        self.scheduler.reconfigure(cfg).await?;
        info!(config = ?config_path, "configuration reloaded");
        Ok(())
    }
}

/// Settings read once at startup that differ in `reloaded`.
pub fn restart_only_changes(startup: &ConfigFile, reloaded: &ConfigFile) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if startup.daemon.pid_file != reloaded.daemon.pid_file {
        changed.push("[backblast].pid_file");
    }
    if startup.scheduler.dispatch_timeout != reloaded.scheduler.dispatch_timeout {
        changed.push("[scheduler].dispatch_timeout");
    }
    if startup.trigger.spool_dir != reloaded.trigger.spool_dir {
        changed.push("[trigger].spool_dir");
    }
    changed
}

/// Start the scheduler and serve until it exits.
pub async fn serve(args: &CliArgs, cfg: ConfigFile, log: LogHandle) -> Result<()> {
    info!("preparing to launch");

    let _pid_file = match args.pid_file.clone().or_else(|| cfg.daemon.pid_file.clone()) {
        Some(path) => Some(PidFile::create(path)?),
        None => None,
    };

    let scheduler = Scheduler::new(SchedulerOptions {
        dispatch_timeout: cfg.scheduler.dispatch_timeout,
        exit_action: ExitAction::ReturnToCaller,
    });
    scheduler.set_launcher(Arc::new(CommandLauncher::new()));

    let worker = scheduler.start()?;
    let server = Server::new(args.config.clone(), log, scheduler.clone(), cfg.clone());
    let spool_dir = cfg.trigger.spool_dir.clone();

    scheduler.reconfigure(cfg).await?;
    scheduler.resume();

    let _spool = match spool_dir {
        Some(dir) => Some(spawn_spool_watcher(dir, scheduler.clone())?),
        None => {
            info!("no [trigger].spool_dir configured; no events will be queued");
            None
        }
    };

    let exit = serve_signals(&server, worker).await?;
    info!(?exit, "backblast shutting down");
    Ok(())
}
