#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use backblast::config::{
    ConfigFile, DaemonSection, LauncherSection, SchedulerSection, TriggerSection,
};
use backblast::engine::{Change, Event};

/// Builder for `ConfigFile` to simplify test setup.
///
/// The launcher command doubles as a marker for which configuration a
/// dispatch observed.
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            config: ConfigFile::new_unchecked(
                DaemonSection::default(),
                SchedulerSection::default(),
                LauncherSection {
                    cmd: cmd.to_string(),
                    env: BTreeMap::new(),
                },
                TriggerSection::default(),
            ),
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config
            .launcher
            .env
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.config.scheduler.dispatch_timeout = Some(timeout);
        self
    }

    pub fn spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.trigger.spool_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> ConfigFile {
        self.config
    }
}

/// Shorthand for a typed event whose change has the given id.
pub fn event(event_type: &str, change_id: &str) -> Event {
    Event::new(event_type, Change::new(change_id))
}

/// Shorthand for an event without a type.
pub fn untyped_event(change_id: &str) -> Event {
    Event::untyped(Change::new(change_id))
}
