// tests/exit_terminate.rs
//
// `ExitAction::Terminate` ends the whole process, so the scheduler runs in a
// child copy of this test binary.

mod common;
use crate::common::builders::{ConfigFileBuilder, event};
use crate::common::fake_launcher::RecordingLauncher;
use crate::common::with_timeout;

use std::error::Error;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use backblast::engine::{ExitAction, Scheduler, SchedulerOptions};

type TestResult = Result<(), Box<dyn Error>>;

const CHILD_ENV: &str = "BACKBLAST_TEST_TERMINATE_CHILD";
const TEST_NAME: &str = "exit_terminates_the_process_with_status_zero";

async fn run_child() -> TestResult {
    let scheduler = Scheduler::default();
    let launcher = RecordingLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));
    let _worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    scheduler.add_event(event("A", "C1"));
    scheduler.exit();

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("still running after exit");
    panic!("scheduler did not terminate the process");
}

#[test]
fn terminate_is_the_default_exit_action() {
    assert_eq!(ExitAction::default(), ExitAction::Terminate);
    assert_eq!(SchedulerOptions::default().exit_action, ExitAction::Terminate);
}

#[tokio::test]
async fn exit_terminates_the_process_with_status_zero() -> TestResult {
    if std::env::var_os(CHILD_ENV).is_some() {
        return run_child().await;
    }

    let output = Command::new(std::env::current_exe()?)
        .args(["--exact", TEST_NAME, "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "child failed: {stdout}");
    assert!(!stdout.contains("still running"), "{stdout}");
    assert!(!stdout.contains("test result"), "child finished its test run: {stdout}");
    Ok(())
}
