use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use backblast::config::ConfigFile;
use backblast::engine::Change;
use backblast::errors::BackblastError;
use backblast::launch::{LaunchFuture, Launcher};
use tokio::sync::Semaphore;

/// One observed `launch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub change: String,
    /// `[launcher].cmd` of the configuration the dispatch carried.
    pub config_cmd: String,
}

/// A fake launcher that:
/// - records every change it was given, with the active config marker
/// - fails for change ids listed in `fail_on`
/// - panics for change ids listed in `panic_on`
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    launched: Arc<Mutex<Vec<Launched>>>,
    fail_on: Arc<HashSet<String>>,
    panic_on: Arc<HashSet<String>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.fail_on = Arc::new(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn panicking_on(mut self, ids: &[&str]) -> Self {
        self.panic_on = Arc::new(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn launched(&self) -> Vec<Launched> {
        self.launched.lock().unwrap().clone()
    }

    pub fn changes(&self) -> Vec<String> {
        self.launched().into_iter().map(|l| l.change).collect()
    }

    pub fn count(&self) -> usize {
        self.launched.lock().unwrap().len()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, change: Change, config: Arc<ConfigFile>) -> LaunchFuture<'_> {
        Box::pin(async move {
            self.launched.lock().unwrap().push(Launched {
                change: change.id.clone(),
                config_cmd: config.launcher.cmd.clone(),
            });

            if self.panic_on.contains(&change.id) {
                panic!("launcher blew up on {}", change.id);
            }
            if self.fail_on.contains(&change.id) {
                return Err(BackblastError::LaunchFailed(format!(
                    "refusing change {}",
                    change.id
                )));
            }
            Ok(())
        })
    }
}

/// A launcher whose calls block until the test releases them.
///
/// Each call records its start, then waits for one permit from
/// [`GatedLauncher::release`]. It also tracks how many launch futures are alive
/// at once, including ones the scheduler has aborted but not yet dropped.
#[derive(Clone)]
pub struct GatedLauncher {
    started: Arc<Mutex<Vec<Launched>>>,
    gate: Arc<Semaphore>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
}

/// Counts one live launch future; released when the future is dropped.
struct LiveGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for GatedLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedLauncher {
    pub fn new() -> Self {
        Self {
            started: Arc::new(Mutex::new(Vec::new())),
            gate: Arc::new(Semaphore::new(0)),
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Let `n` launches (current or future) finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn started(&self) -> Vec<Launched> {
        self.started.lock().unwrap().clone()
    }

    pub fn started_count(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    /// Highest number of launch futures that were alive at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

impl Launcher for GatedLauncher {
    fn launch(&self, change: Change, config: Arc<ConfigFile>) -> LaunchFuture<'_> {
        Box::pin(async move {
            let now_live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(now_live, Ordering::SeqCst);
            let _guard = LiveGuard {
                live: Arc::clone(&self.live),
            };

            self.started.lock().unwrap().push(Launched {
                change: change.id.clone(),
                config_cmd: config.launcher.cmd.clone(),
            });

            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| BackblastError::Other(e.into()))?;
            permit.forget();
            Ok(())
        })
    }
}
