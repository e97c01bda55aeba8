// src/launch/command.rs

//! Launcher that runs a shell command per change.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{ConfigFile, LauncherSection};
use crate::engine::Change;
use crate::errors::{BackblastError, Result};

use super::backend::{LaunchFuture, Launcher};

/// Environment variable carrying the change id.
pub const CHANGE_ID_ENV: &str = "BACKBLAST_CHANGE_ID";

/// Prefix for per-parameter environment variables.
pub const PARAM_ENV_PREFIX: &str = "BACKBLAST_PARAM_";

/// Runs `[launcher].cmd` through the platform shell.
///
/// The command sees `[launcher.env]`, `BACKBLAST_CHANGE_ID`, and one
/// `BACKBLAST_PARAM_<KEY>` variable per change parameter. A non-zero exit is
/// reported as [`BackblastError::LaunchFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLauncher;

impl CommandLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for CommandLauncher {
    fn launch(&self, change: Change, config: Arc<ConfigFile>) -> LaunchFuture<'_> {
        Box::pin(async move { run_launch_command(&change, &config.launcher).await })
    }
}

/// `retry-count` -> `BACKBLAST_PARAM_RETRY_COUNT`.
pub fn param_env_name(key: &str) -> String {
    let suffix: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{PARAM_ENV_PREFIX}{suffix}")
}

async fn run_launch_command(change: &Change, settings: &LauncherSection) -> Result<()> {
    info!(change = %change.id, cmd = %settings.cmd, "launching change");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&settings.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&settings.cmd);
        c
    };

    cmd.envs(&settings.env)
        .env(CHANGE_ID_ENV, &change.id)
        .envs(
            change
                .params
                .iter()
                .map(|(key, value)| (param_env_name(key), value.as_str())),
        )
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // The scheduler aborts timed-out launches; take the child down with it.
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        BackblastError::LaunchFailed(format!(
            "spawning launch command for change '{}': {}",
            change.id, e
        ))
    })?;

    if let Some(stdout) = child.stdout.take() {
        forward_lines(change.id.clone(), "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(change.id.clone(), "stderr", stderr);
    }

    let status = child.wait().await?;
    let code = status.code().unwrap_or(-1);

    if !status.success() {
        return Err(BackblastError::LaunchFailed(format!(
            "launch command for change '{}' exited with code {}",
            change.id, code
        )));
    }

    info!(change = %change.id, exit_code = code, "launch command finished");
    Ok(())
}

/// Consume a child stream so its pipe never fills; log each line at debug.
fn forward_lines<R>(change: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(change = %change, stream, "{}", line);
        }
    });
}
