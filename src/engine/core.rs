// src/engine/core.rs

//! Pure core scheduler state machine.
//!
//! This module contains a synchronous, deterministic "core" that owns:
//! - the event queue
//! - the four control flags (`exiting`, `pausing`, `reconfiguring`, `stopped`)
//! - the active configuration snapshot
//!
//! It answers the two questions the worker asks on every iteration: "what do I
//! dispatch now?" ([`SchedulerCore::next_dispatch`]) and "what do I do after
//! that?" ([`SchedulerCore::after_dispatch`]). The async shell
//! (`engine::scheduler::Scheduler`) keeps the core behind its queue lock and is
//! responsible for waiting on the wake signal, calling the launcher and
//! executing the returned [`CoreCommand`]s.
//!
//! The core has **no** channels, no Tokio types, and does not perform any IO,
//! so every transition can be unit tested directly.

use std::sync::Arc;

use tracing::debug;

use crate::config::ConfigFile;

use super::handlers::{
    CoreCommand, CoreStep, PauseOutcome, handle_pause_request, may_dispatch, should_rewake,
};
use super::queue::EventQueue;
use super::{Event, WorkerState};

/// Control flags, mutated only under the queue lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub exiting: bool,
    pub pausing: bool,
    pub reconfiguring: bool,
    pub stopped: bool,
}

/// One unit of work handed to the launcher: the dequeued event plus the
/// configuration that was active when it was dequeued.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub event: Event,
    pub config: Arc<ConfigFile>,
}

#[derive(Debug)]
pub struct SchedulerCore {
    queue: EventQueue,
    flags: ControlFlags,
    config: Option<Arc<ConfigFile>>,
    state: WorkerState,
}

impl Default for SchedulerCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerCore {
    pub fn new() -> Self {
        Self {
            queue: EventQueue::new(),
            flags: ControlFlags::default(),
            config: None,
            state: WorkerState::Idle,
        }
    }

    pub fn flags(&self) -> ControlFlags {
        self.flags
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn set_state(&mut self, state: WorkerState) {
        self.state = state;
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> Option<Arc<ConfigFile>> {
        self.config.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.stopped
    }

    pub fn is_terminated(&self) -> bool {
        self.state == WorkerState::Terminated
    }

    /// Enqueue `event` if it carries a type.
    ///
    /// Returns `false` when the event was dropped. Either way the caller is
    /// expected to signal `wake`.
    pub fn add_event(&mut self, event: Event) -> bool {
        match event.event_type {
            Some(ref event_type) => {
                debug!(
                    event_type = %event_type,
                    change = %event.change.id,
                    "queued trigger event"
                );
                self.queue.put(event);
                true
            }
            None => {
                debug!(change = %event.change.id, "dropping event without a type");
                false
            }
        }
    }

    /// Install `config` and request a pause so the worker can acknowledge it.
    pub fn request_reconfigure(&mut self, config: Arc<ConfigFile>) {
        self.config = Some(config);
        self.flags.pausing = true;
        self.flags.reconfiguring = true;
    }

    pub fn request_exit(&mut self) {
        self.flags.pausing = true;
        self.flags.exiting = true;
    }

    pub fn request_stop(&mut self) {
        self.flags.stopped = true;
    }

    /// Step 4 of an iteration: dequeue exactly one event if allowed.
    ///
    /// Nothing is dequeued while paused or before the first configuration is
    /// installed.
    pub fn next_dispatch(&mut self) -> Option<Dispatch> {
        if !may_dispatch(&self.flags, self.config.is_some()) {
            return None;
        }

        let config = self.config.clone()?;
        let event = self.queue.get()?;
        self.state = WorkerState::Draining;

        Some(Dispatch { event, config })
    }

    /// Steps 5 and 6 of an iteration: service a pause request, then decide
    /// whether the worker should wake itself to keep draining.
    pub fn after_dispatch(&mut self) -> CoreStep {
        let mut commands = Vec::new();

        if self.flags.pausing {
            self.state = WorkerState::PauseHandling;

            match handle_pause_request(&mut self.flags) {
                PauseOutcome::Exit => {
                    self.state = WorkerState::Terminated;
                    return CoreStep {
                        commands: vec![CoreCommand::Exit],
                        keep_running: false,
                    };
                }
                PauseOutcome::ReconfigureComplete => {
                    commands.push(CoreCommand::CompleteReconfigure);
                }
                PauseOutcome::StillPaused => {}
            }
        }

        if should_rewake(&self.flags, self.config.is_some(), self.queue.len()) {
            commands.push(CoreCommand::Rewake);
        }

        CoreStep {
            commands,
            keep_running: true,
        }
    }
}
