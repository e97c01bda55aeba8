#![allow(dead_code)]

pub use backblast_test_utils::builders;
pub use backblast_test_utils::fake_launcher;
pub use backblast_test_utils::{eventually, init_tracing, with_timeout};

use backblast::engine::{ExitAction, Scheduler, SchedulerOptions};

/// A scheduler whose exit returns from the worker instead of ending the test
/// process.
pub fn test_scheduler() -> Scheduler {
    Scheduler::new(SchedulerOptions {
        dispatch_timeout: None,
        exit_action: ExitAction::ReturnToCaller,
    })
}
