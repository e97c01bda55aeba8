// src/server/signals.rs

//! OS signal wiring.
//!
//! Tokio's signal streams are backed by a self-pipe, so nothing here runs in
//! a real signal-handler context; every handler is an ordinary async branch
//! that calls into the scheduler.
//!
//! | Signal  | Action                              |
//! |---------|-------------------------------------|
//! | SIGHUP  | reload config, then `reconfigure`   |
//! | SIGUSR1 | `exit`                              |
//! | SIGTERM | `exit`                              |
//! | SIGINT  | `exit` (interactive Ctrl+C)         |

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::engine::WorkerExit;
use crate::errors::Result;

use super::Server;

/// Holds the running reload task, if any. SIGHUPs that arrive while it is
/// still running are ignored.
#[derive(Debug, Default)]
pub struct ReloadSlot {
    task: Option<JoinHandle<()>>,
}

impl ReloadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start a reload unless one is still running. Returns whether it started.
    pub fn try_start(&mut self, server: &Server) -> bool {
        if self.is_busy() {
            info!("reload already in progress; ignoring SIGHUP");
            return false;
        }
        self.task = Some(server.spawn_reload());
        true
    }
}

/// Serve signals until the scheduler worker finishes.
#[cfg(unix)]
pub async fn serve_signals(
    server: &Server,
    mut worker: JoinHandle<WorkerExit>,
) -> Result<WorkerExit> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut user1 = signal(SignalKind::user_defined1())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    let mut reload = ReloadSlot::new();

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                if reload.try_start(server) {
                    info!("SIGHUP received; reloading configuration");
                }
            }
            _ = user1.recv() => {
                info!("SIGUSR1 received; asking scheduler to exit");
                server.scheduler().exit();
            }
            _ = terminate.recv() => {
                info!("SIGTERM received; asking scheduler to exit");
                server.scheduler().exit();
            }
            _ = interrupt.recv() => {
                eprintln!("Ctrl + C: asking scheduler to exit nicely...");
                server.scheduler().exit();
            }
            joined = &mut worker => {
                return finish(joined);
            }
        }
    }
}

/// Without Unix signals only Ctrl+C is available.
#[cfg(not(unix))]
pub async fn serve_signals(
    server: &Server,
    mut worker: JoinHandle<WorkerExit>,
) -> Result<WorkerExit> {
    use tracing::warn;

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                    return finish((&mut worker).await);
                }
                eprintln!("Ctrl + C: asking scheduler to exit nicely...");
                server.scheduler().exit();
            }
            joined = &mut worker => {
                return finish(joined);
            }
        }
    }
}

fn finish(joined: std::result::Result<WorkerExit, tokio::task::JoinError>) -> Result<WorkerExit> {
    match joined {
        Ok(exit) => {
            info!(?exit, "scheduler worker finished");
            Ok(exit)
        }
        Err(err) => {
            error!(error = %err, "scheduler worker failed");
            Err(anyhow::Error::from(err).into())
        }
    }
}
