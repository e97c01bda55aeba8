// src/config/validate.rs

use std::path::Path;

use crate::config::model::{
    ConfigFile, DaemonSection, LauncherSection, RawConfigFile, SchedulerSection, TriggerSection,
};
use crate::errors::{BackblastError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BackblastError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_launcher(&raw)?;
        validate_paths(&raw)?;
        let dispatch_timeout = parse_dispatch_timeout(&raw)?;

        Ok(ConfigFile::new_unchecked(
            DaemonSection {
                log_level: raw.backblast.log_level,
                pid_file: raw.backblast.pid_file,
            },
            SchedulerSection { dispatch_timeout },
            LauncherSection {
                cmd: raw.launcher.cmd.trim().to_string(),
                env: raw.launcher.env,
            },
            TriggerSection {
                spool_dir: raw.trigger.spool_dir,
            },
        ))
    }
}

fn validate_launcher(cfg: &RawConfigFile) -> Result<()> {
    if cfg.launcher.cmd.trim().is_empty() {
        return Err(BackblastError::ConfigError(
            "[launcher].cmd must not be empty".to_string(),
        ));
    }

    for key in cfg.launcher.env.keys() {
        if key.is_empty() || key.contains('=') {
            return Err(BackblastError::ConfigError(format!(
                "[launcher.env] has invalid variable name '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    ensure_non_empty_path("[backblast].pid_file", cfg.backblast.pid_file.as_deref())?;
    ensure_non_empty_path("[trigger].spool_dir", cfg.trigger.spool_dir.as_deref())?;
    Ok(())
}

fn ensure_non_empty_path(field: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) if p.as_os_str().is_empty() => Err(BackblastError::ConfigError(format!(
            "{} must not be empty when set",
            field
        ))),
        _ => Ok(()),
    }
}

fn parse_dispatch_timeout(cfg: &RawConfigFile) -> Result<Option<std::time::Duration>> {
    let Some(raw) = cfg.scheduler.dispatch_timeout.as_deref() else {
        return Ok(None);
    };

    let timeout = parse_duration(raw).map_err(|e| {
        BackblastError::ConfigError(format!("invalid [scheduler].dispatch_timeout: {}", e))
    })?;

    if timeout.is_zero() {
        return Err(BackblastError::ConfigError(
            "[scheduler].dispatch_timeout must be greater than zero".to_string(),
        ));
    }

    Ok(Some(timeout))
}
