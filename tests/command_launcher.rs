// tests/command_launcher.rs

#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;

use backblast::engine::Change;
use backblast::errors::BackblastError;
use backblast::launch::{CommandLauncher, Launcher, param_env_name};
use backblast_test_utils::builders::ConfigFileBuilder;
use backblast_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn param_keys_become_upper_snake_env_names() {
    assert_eq!(param_env_name("number"), "BACKBLAST_PARAM_NUMBER");
    assert_eq!(param_env_name("retry-count"), "BACKBLAST_PARAM_RETRY_COUNT");
    assert_eq!(param_env_name("a.b c"), "BACKBLAST_PARAM_A_B_C");
}

#[tokio::test]
async fn command_sees_change_and_configured_environment() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out.txt");
    let cmd = format!(
        "printf '%s|%s|%s' \"$BACKBLAST_CHANGE_ID\" \"$BACKBLAST_PARAM_NUMBER\" \"$PBX_HOST\" \
         > '{}'",
        out.display()
    );
    let config = ConfigFileBuilder::new(&cmd).env("PBX_HOST", "pbx.local").build();
    let change = Change::new("4711").with_param("number", "555-0100");

    with_timeout(CommandLauncher::new().launch(change, Arc::new(config))).await?;

    assert_eq!(std::fs::read_to_string(&out)?, "4711|555-0100|pbx.local");
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_a_launch_failure() -> TestResult {
    init_tracing();

    let config = ConfigFileBuilder::new("echo dialing; exit 3").build();

    match with_timeout(CommandLauncher::new().launch(Change::new("C1"), Arc::new(config))).await {
        Err(BackblastError::LaunchFailed(msg)) => {
            assert!(msg.contains("C1"));
            assert!(msg.contains("code 3"));
        }
        other => panic!("Expected LaunchFailed, got: {:?}", other),
    }
    Ok(())
}
