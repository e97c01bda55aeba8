// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BackblastError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it into a complete
/// [`ConfigFile`] snapshot.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// System-wide default location, used when `-c` is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("/etc/backblast/backblast.toml")
}

/// Resolve which config file to read.
///
/// An explicit path replaces the default rather than adding to it. A leading
/// `~/` is expanded from `$HOME`.
pub fn locate_config(explicit: Option<&Path>) -> Result<PathBuf> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => vec![default_config_path()],
    };

    for candidate in candidates.iter() {
        let expanded = expand_home(candidate);
        if expanded.is_file() {
            return Ok(expanded);
        }
    }

    Err(BackblastError::ConfigError(format!(
        "unable to locate config file in {:?}",
        candidates
    )))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
