// src/engine/mod.rs

//! Scheduling engine for backblast.
//!
//! This module ties together:
//! - the event model (`Event`, `Change`)
//! - the FIFO event queue
//! - the single-worker scheduler that drains the queue into the launcher and
//!   services pause / reconfigure / exit / stop requests
//!
//! The pure state machine lives in [`core`] (with the pause and drain rules in
//! [`handlers`]); the async shell that owns the worker task and the control
//! surface is [`scheduler`].

use std::collections::BTreeMap;

use serde::Deserialize;

/// Discriminator carried by an [`Event`], e.g. `"change-created"`.
pub type EventType = String;

/// Opaque unit of work forwarded to the launcher.
///
/// The scheduler never looks inside a change; only launchers do.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Change {
    pub id: String,

    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Change {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A trigger notification.
///
/// An event whose `event_type` is `None` is never enqueued; handing it to
/// `Scheduler::add_event` only wakes the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: Option<EventType>,
    pub change: Change,
}

impl Event {
    pub fn new(event_type: impl Into<EventType>, change: Change) -> Self {
        Self {
            event_type: Some(event_type.into()),
            change,
        }
    }

    /// An event without a type (a bare wake-up trigger).
    pub fn untyped(change: Change) -> Self {
        Self {
            event_type: None,
            change,
        }
    }
}

/// Where the worker loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Not spawned yet.
    Idle,
    /// Blocked on the wake signal.
    Waiting,
    /// Dispatching one event to the launcher.
    Draining,
    /// Servicing a pause request (exit or reconfigure).
    PauseHandling,
    /// The loop has returned.
    Terminated,
}

/// Why the worker task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// `Scheduler::stop` was observed.
    Stopped,
    /// `Scheduler::exit` was observed with `ExitAction::ReturnToCaller`.
    Exited,
}

pub mod core;
pub mod handlers;
pub mod queue;
pub mod scheduler;

pub use self::core::{ControlFlags, Dispatch, SchedulerCore};
pub use handlers::{CoreCommand, CoreStep, PauseOutcome};
pub use queue::EventQueue;
pub use scheduler::{ExitAction, Scheduler, SchedulerOptions};
