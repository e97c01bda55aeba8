// src/server/pidfile.rs

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{BackblastError, Result};

/// PID file that is removed again when dropped.
///
/// Creation fails if the file already exists, so two daemons sharing a PID
/// file cannot both start.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(BackblastError::ConfigError(format!(
                    "pid file {:?} already exists; is another backblast running?",
                    path
                )));
            }
            Err(err) => return Err(err.into()),
        };

        writeln!(file, "{}", std::process::id())?;
        debug!(pid_file = ?path, "wrote pid file");

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(pid_file = ?self.path, error = %err, "failed to remove pid file");
        }
    }
}
