// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackblastError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Event file error: {0}")]
    EventFileError(String),

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    /// `reconfigure` was called while a previous call had not returned yet.
    #[error("a reconfigure request is already in flight")]
    ReconfigureInFlight,

    #[error("scheduler worker is not running")]
    WorkerNotRunning,

    #[error("scheduler worker already started")]
    AlreadyStarted,

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BackblastError>;
