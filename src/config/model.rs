// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::LogLevel;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [backblast]
/// log_level = "debug"
/// pid_file = "/var/run/backblast/backblast.pid"
///
/// [scheduler]
/// dispatch_timeout = "30s"
///
/// [launcher]
/// cmd = "/usr/local/bin/dial"
///
/// [launcher.env]
/// ASTERISK_HOST = "pbx.local"
///
/// [trigger]
/// spool_dir = "/var/spool/backblast"
/// ```
///
/// Only `[launcher]` is required. Convert into a [`ConfigFile`] with
/// `ConfigFile::try_from` to get validated values.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub backblast: RawDaemonSection,

    #[serde(default)]
    pub scheduler: RawSchedulerSection,

    pub launcher: RawLauncherSection,

    #[serde(default)]
    pub trigger: RawTriggerSection,
}

/// `[backblast]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDaemonSection {
    /// Log level used when neither `--log-level` nor `BACKBLAST_LOG` is set.
    #[serde(default)]
    pub log_level: Option<LogLevel>,

    /// Where to write the daemon's PID. No PID file when unset.
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSchedulerSection {
    /// Upper bound for a single launcher call, e.g. `"30s"`.
    #[serde(default)]
    pub dispatch_timeout: Option<String>,
}

/// `[launcher]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLauncherSection {
    /// Shell command run once per dispatched change.
    pub cmd: String,

    /// Extra environment variables for the launch command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `[trigger]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTriggerSection {
    /// Directory watched for `*.toml` event files.
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
}

/// Validated configuration snapshot.
///
/// Built only through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// [`ConfigFile::new_unchecked`] for callers that already hold validated parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub daemon: DaemonSection,
    pub scheduler: SchedulerSection,
    pub launcher: LauncherSection,
    pub trigger: TriggerSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonSection {
    pub log_level: Option<LogLevel>,
    pub pid_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSection {
    pub dispatch_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSection {
    pub cmd: String,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSection {
    pub spool_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn new_unchecked(
        daemon: DaemonSection,
        scheduler: SchedulerSection,
        launcher: LauncherSection,
        trigger: TriggerSection,
    ) -> Self {
        Self {
            daemon,
            scheduler,
            launcher,
            trigger,
        }
    }
}
