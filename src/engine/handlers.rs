// src/engine/handlers.rs

//! Pause handling and drain rules for the core state machine.

use super::core::ControlFlags;

/// Command produced by the pure core, to be executed by the async shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Resolve the pending reconfigure acknowledgement.
    CompleteReconfigure,
    /// Signal `wake` again so the remaining queue is drained without an
    /// external trigger.
    Rewake,
    /// Terminate: no further events may be dispatched.
    Exit,
}

/// Decision returned by the core after one worker iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the worker loop should go back to waiting.
    pub keep_running: bool,
}

/// Result of servicing a pause request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    /// `exiting` was set; the worker must terminate.
    Exit,
    /// `reconfiguring` was set; the pause is lifted and the waiting
    /// `reconfigure` caller must be released.
    ReconfigureComplete,
    /// Nothing to service; the pause stays in effect.
    StillPaused,
}

/// Service a pause request. Exit takes precedence over reconfigure.
pub fn handle_pause_request(flags: &mut ControlFlags) -> PauseOutcome {
    if flags.exiting {
        return PauseOutcome::Exit;
    }

    if flags.reconfiguring {
        flags.pausing = false;
        flags.reconfiguring = false;
        return PauseOutcome::ReconfigureComplete;
    }

    PauseOutcome::StillPaused
}

/// Whether the worker may dequeue: not paused and a configuration is active.
pub fn may_dispatch(flags: &ControlFlags, configured: bool) -> bool {
    !flags.pausing && configured
}

/// Whether the worker should wake itself to keep draining.
///
/// Must be evaluated under the queue lock, after pause handling.
pub fn should_rewake(flags: &ControlFlags, configured: bool, queued: usize) -> bool {
    may_dispatch(flags, configured) && queued > 0
}
