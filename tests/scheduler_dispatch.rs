// tests/scheduler_dispatch.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, event, untyped_event};
use crate::common::fake_launcher::{GatedLauncher, RecordingLauncher};
use crate::common::{eventually, init_tracing, test_scheduler, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use backblast::engine::{ExitAction, Scheduler, SchedulerOptions, WorkerExit};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn launches_changes_in_fifo_order_then_under_new_config() -> TestResult {
    init_tracing();

    let scheduler = test_scheduler();
    let launcher = RecordingLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));

    let worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    scheduler.add_event(event("A", "C1"));
    scheduler.add_event(event("A", "C2"));
    scheduler.resume();

    eventually(|| launcher.count() == 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(launcher.changes(), vec!["C1", "C2"]);

    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("two").build())).await?;
    scheduler.add_event(event("A", "C3"));

    eventually(|| launcher.count() == 3).await;
    let launched = launcher.launched();
    assert_eq!(launched[2].change, "C3");
    assert_eq!(launched[2].config_cmd, "two");
    assert!(launched[..2].iter().all(|l| l.config_cmd == "one"));

    scheduler.stop();
    assert_eq!(with_timeout(worker).await?, WorkerExit::Stopped);
    Ok(())
}

#[tokio::test]
async fn long_backlog_is_drained_without_further_triggers() -> TestResult {
    init_tracing();

    let scheduler = test_scheduler();
    let launcher = RecordingLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));

    // Queued before the worker exists; add_event's wake-ups coalesce.
    let expected: Vec<String> = (0..50).map(|i| format!("C{i}")).collect();
    for id in expected.iter() {
        assert!(scheduler.add_event(event("A", id)));
    }

    let _worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    eventually(|| launcher.count() == expected.len()).await;
    assert_eq!(launcher.changes(), expected);
    assert_eq!(scheduler.queue_len(), 0);
    Ok(())
}

#[tokio::test]
async fn events_wait_for_the_first_configuration() -> TestResult {
    init_tracing();

    let scheduler = test_scheduler();
    let launcher = RecordingLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));
    let _worker = scheduler.start()?;

    scheduler.add_event(event("A", "C1"));
    scheduler.resume();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(launcher.count(), 0);
    assert_eq!(scheduler.queue_len(), 1);

    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;
    eventually(|| launcher.count() == 1).await;
    assert_eq!(launcher.launched()[0].config_cmd, "one");
    Ok(())
}

#[tokio::test]
async fn untyped_events_are_dropped_but_still_wake() -> TestResult {
    init_tracing();

    let scheduler = test_scheduler();
    let launcher = RecordingLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));
    let _worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    assert!(!scheduler.add_event(untyped_event("C0")));
    assert_eq!(scheduler.queue_len(), 0);

    assert!(scheduler.add_event(event("A", "C1")));
    eventually(|| launcher.count() == 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(launcher.changes(), vec!["C1"]);
    Ok(())
}

#[tokio::test]
async fn launcher_failures_and_panics_do_not_stop_the_worker() -> TestResult {
    init_tracing();

    let scheduler = test_scheduler();
    let launcher = RecordingLauncher::new()
        .failing_on(&["C2"])
        .panicking_on(&["C3"]);
    scheduler.set_launcher(Arc::new(launcher.clone()));
    let worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    for id in ["C1", "C2", "C3", "C4"] {
        scheduler.add_event(event("A", id));
    }

    eventually(|| launcher.count() == 4).await;
    assert_eq!(launcher.changes(), vec!["C1", "C2", "C3", "C4"]);
    assert!(!worker.is_finished());

    // Failed changes are not retried.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(launcher.count(), 4);
    Ok(())
}

#[tokio::test]
async fn changes_are_discarded_while_no_launcher_is_bound() -> TestResult {
    init_tracing();

    let scheduler = test_scheduler();
    let worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    scheduler.add_event(event("A", "C1"));
    eventually(|| scheduler.queue_len() == 0).await;

    let launcher = RecordingLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));
    scheduler.add_event(event("A", "C2"));

    eventually(|| launcher.count() == 1).await;
    assert_eq!(launcher.changes(), vec!["C2"]);
    assert!(!worker.is_finished());
    Ok(())
}

#[tokio::test]
async fn dispatch_timeout_aborts_a_hung_launch() -> TestResult {
    init_tracing();

    let scheduler = Scheduler::new(SchedulerOptions {
        dispatch_timeout: Some(Duration::from_millis(50)),
        exit_action: ExitAction::ReturnToCaller,
    });
    let launcher = GatedLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));
    let _worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    scheduler.add_event(event("A", "C1"));
    scheduler.add_event(event("A", "C2"));

    // Never released: both launches hang and are cut off in turn.
    eventually(|| launcher.started_count() == 2).await;
    let started: Vec<String> = launcher.started().into_iter().map(|l| l.change).collect();
    assert_eq!(started, vec!["C1", "C2"]);

    // A reconfigure is not starved by the hung launch.
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("two").build())).await?;
    Ok(())
}

#[tokio::test]
async fn timed_out_launch_is_gone_before_the_next_one_starts() -> TestResult {
    init_tracing();

    let scheduler = Scheduler::new(SchedulerOptions {
        dispatch_timeout: Some(Duration::from_millis(30)),
        exit_action: ExitAction::ReturnToCaller,
    });
    let launcher = GatedLauncher::new();
    scheduler.set_launcher(Arc::new(launcher.clone()));
    let _worker = scheduler.start()?;
    with_timeout(scheduler.reconfigure(ConfigFileBuilder::new("one").build())).await?;

    for id in ["C1", "C2", "C3", "C4"] {
        scheduler.add_event(event("A", id));
    }

    eventually(|| launcher.started_count() == 4).await;
    assert_eq!(launcher.max_concurrent(), 1);
    Ok(())
}

#[tokio::test]
async fn start_twice_is_rejected() -> TestResult {
    let scheduler = test_scheduler();
    let _worker = scheduler.start()?;

    assert!(matches!(
        scheduler.start(),
        Err(backblast::errors::BackblastError::AlreadyStarted)
    ));
    Ok(())
}
