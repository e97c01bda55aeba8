// src/engine/scheduler.rs

//! The scheduler handle and its single background worker.
//!
//! `Scheduler` is the control surface used by the driver, signal glue and
//! producers. It is cheap to clone; every clone talks to the same worker.
//!
//! Synchronisation:
//! - one mutex (the "queue lock") guards the [`SchedulerCore`], the launcher
//!   reference and the pending reconfigure acknowledgement; it is never held
//!   across an `.await`
//! - `wake` is a [`Notify`] used through `notify_one`, so signals raised while
//!   the worker is busy coalesce into a single wake-up
//! - each `reconfigure` call waits on its own oneshot, resolved by the worker
//!   once it has observed the pause
//!
//! The launcher call itself runs outside the lock on a spawned task that the
//! worker awaits, so a slow launch never blocks producers, while dispatch
//! stays strictly one-at-a-time and in FIFO order.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ConfigFile;
use crate::errors::{BackblastError, Result};
use crate::launch::Launcher;

use super::core::{ControlFlags, Dispatch, SchedulerCore};
use super::handlers::CoreCommand;
use super::{Event, WorkerExit, WorkerState};

/// What the worker does once it observes an exit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    /// Terminate the process immediately with status 0. No cleanup runs.
    Terminate,
    /// Finish the worker task with [`WorkerExit::Exited`] and leave process
    /// termination to whoever awaits it.
    ReturnToCaller,
}

impl Default for ExitAction {
    fn default() -> Self {
        ExitAction::Terminate
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerOptions {
    /// Upper bound for one launcher call. `None` waits indefinitely.
    pub dispatch_timeout: Option<Duration>,
    pub exit_action: ExitAction,
}

struct Inner {
    core: SchedulerCore,
    launcher: Option<Arc<dyn Launcher>>,
    reconfigure_ack: Option<oneshot::Sender<()>>,
    worker_spawned: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    wake: Notify,
    options: SchedulerOptions,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Nothing under the lock can be left half-updated by a panic, so a
        // poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Step 2: terminate if `stop` was requested.
    fn take_stop(&self) -> bool {
        let mut inner = self.lock();
        if !inner.core.is_stopped() {
            return false;
        }
        inner.core.set_state(WorkerState::Terminated);
        inner.reconfigure_ack.take();
        true
    }

    fn finish_exit(&self) -> WorkerExit {
        // A reconfigure caller still waiting now gets `WorkerNotRunning`.
        self.lock().reconfigure_ack.take();

        match self.options.exit_action {
            ExitAction::Terminate => {
                info!("exiting");
                std::process::exit(0)
            }
            ExitAction::ReturnToCaller => {
                info!("scheduler worker exiting on request");
                WorkerExit::Exited
            }
        }
    }
}

/// Handle to the single scheduler worker.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("Scheduler")
            .field("core", &inner.core)
            .field("has_launcher", &inner.launcher.is_some())
            .field("options", &self.shared.options)
            .finish_non_exhaustive()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerOptions::default())
    }
}

impl Scheduler {
    pub fn new(options: SchedulerOptions) -> Self {
        debug!(?options, "preparing scheduler");
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    core: SchedulerCore::new(),
                    launcher: None,
                    reconfigure_ack: None,
                    worker_spawned: false,
                }),
                wake: Notify::new(),
                options,
            }),
        }
    }

    /// Spawn the worker loop on the current Tokio runtime.
    ///
    /// Does not block. Only one worker may ever be started per scheduler.
    pub fn start(&self) -> Result<JoinHandle<WorkerExit>> {
        {
            let mut inner = self.shared.lock();
            if inner.worker_spawned {
                return Err(BackblastError::AlreadyStarted);
            }
            inner.worker_spawned = true;
        }

        let shared = Arc::clone(&self.shared);
        Ok(tokio::spawn(run_worker(shared)))
    }

    /// Install `config`, pause the worker, and wait until the worker has
    /// acknowledged the pause.
    ///
    /// When this returns `Ok`, every event dispatched afterwards sees `config`.
    ///
    /// Precondition: at most one call in flight. A concurrent second call is
    /// rejected with [`BackblastError::ReconfigureInFlight`], never queued.
    pub async fn reconfigure(&self, config: ConfigFile) -> Result<()> {
        debug!("prepare to reconfigure");

        let ack = {
            let mut inner = self.shared.lock();
            if inner.core.is_stopped() || inner.core.is_terminated() {
                return Err(BackblastError::WorkerNotRunning);
            }
            if inner.reconfigure_ack.is_some() {
                return Err(BackblastError::ReconfigureInFlight);
            }

            let (tx, rx) = oneshot::channel();
            inner.reconfigure_ack = Some(tx);
            inner.core.request_reconfigure(Arc::new(config));
            rx
        };

        self.shared.wake.notify_one();

        debug!("waiting for reconfiguration");
        ack.await.map_err(|_| BackblastError::WorkerNotRunning)?;
        debug!("reconfiguration complete");
        Ok(())
    }

    /// Wake the worker without waiting for anything.
    pub fn resume(&self) {
        debug!("resuming processing");
        self.shared.wake.notify_one();
    }

    /// Ask the worker to exit. Returns immediately; see [`ExitAction`].
    pub fn exit(&self) {
        debug!("prepare to exit");
        self.shared.lock().core.request_exit();
        self.shared.wake.notify_one();
    }

    /// Ask the worker loop to return on its next wake-up.
    pub fn stop(&self) {
        debug!("prepare to stop");
        self.shared.lock().core.request_stop();
        self.shared.wake.notify_one();
    }

    /// Bind the launcher. Must happen before the first `resume`.
    pub fn set_launcher(&self, launcher: Arc<dyn Launcher>) {
        self.shared.lock().launcher = Some(launcher);
    }

    /// Enqueue `event` and wake the worker.
    ///
    /// An event without a type is dropped, but the worker is still woken.
    /// Returns whether the event was queued.
    pub fn add_event(&self, event: Event) -> bool {
        let queued = self.shared.lock().core.add_event(event);
        self.shared.wake.notify_one();
        queued
    }

    pub fn queue_len(&self) -> usize {
        self.shared.lock().core.queue_len()
    }

    pub fn control_flags(&self) -> ControlFlags {
        self.shared.lock().core.flags()
    }

    pub fn worker_state(&self) -> WorkerState {
        self.shared.lock().core.state()
    }

    pub fn active_config(&self) -> Option<Arc<ConfigFile>> {
        self.shared.lock().core.config()
    }
}

/// The worker loop: wait, check stop, dispatch one event, handle pause, repeat.
async fn run_worker(shared: Arc<Shared>) -> WorkerExit {
    info!("scheduler worker started");

    loop {
        shared.lock().core.set_state(WorkerState::Waiting);
        debug!("run handler sleeping");
        shared.wake.notified().await;

        if shared.take_stop() {
            info!("scheduler worker stopped");
            return WorkerExit::Stopped;
        }
        debug!("run handler awake");

        let next = {
            let mut inner = shared.lock();
            let dispatch = inner.core.next_dispatch();
            let launcher = inner.launcher.clone();
            dispatch.map(|d| (d, launcher))
        };

        if let Some((dispatch, launcher)) = next {
            dispatch_one(dispatch, launcher, shared.options.dispatch_timeout).await;
        }

        let (step, mut ack) = {
            let mut inner = shared.lock();
            let step = inner.core.after_dispatch();
            let ack = if step.commands.contains(&CoreCommand::CompleteReconfigure) {
                inner.reconfigure_ack.take()
            } else {
                None
            };
            (step, ack)
        };

        for command in step.commands {
            match command {
                CoreCommand::CompleteReconfigure => {
                    info!("performed reconfiguration");
                    if let Some(ack) = ack.take() {
                        // The caller may have given up waiting; nothing to do then.
                        let _ = ack.send(());
                    }
                }
                CoreCommand::Rewake => shared.wake.notify_one(),
                CoreCommand::Exit => debug!("exit request observed"),
            }
        }

        if !step.keep_running {
            return shared.finish_exit();
        }
    }
}

/// Hand one change to the launcher and wait for it, swallowing every failure.
async fn dispatch_one(
    dispatch: Dispatch,
    launcher: Option<Arc<dyn Launcher>>,
    timeout: Option<Duration>,
) {
    let Dispatch { event, config } = dispatch;
    let change_id = event.change.id.clone();

    let Some(launcher) = launcher else {
        error!(change = %change_id, "no launcher bound; discarding change");
        return;
    };

    debug!(
        event_type = ?event.event_type,
        change = %change_id,
        "processing trigger event"
    );

    let change = event.change;
    let mut task = tokio::spawn(async move { launcher.launch(change, config).await });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                // The launch future (and any child it owns) must be gone
                // before the next dispatch starts.
                task.abort();
                let _ = task.await;
                error!(
                    change = %change_id,
                    timeout_ms = limit.as_millis() as u64,
                    "launch timed out; aborted"
                );
                return;
            }
        },
        None => task.await,
    };

    match joined {
        Ok(Ok(())) => debug!(change = %change_id, "change launched"),
        Ok(Err(err)) => {
            error!(change = %change_id, error = %err, "exception while launching change")
        }
        Err(err) if err.is_panic() => error!(change = %change_id, "launcher panicked"),
        Err(err) => error!(change = %change_id, error = %err, "launch task did not complete"),
    }
}
