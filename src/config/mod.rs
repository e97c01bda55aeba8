// src/config/mod.rs

//! Configuration loading and validation for backblast.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Locate and load a config file from disk (`loader.rs`).
//! - Validate the raw model into a typed [`ConfigFile`] (`validate.rs`).
//!
//! The scheduler treats a [`ConfigFile`] as an opaque, complete snapshot; only
//! the driver and the launcher read its contents.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, locate_config};
pub use model::{
    ConfigFile, DaemonSection, LauncherSection, RawConfigFile, RawDaemonSection,
    RawLauncherSection, RawSchedulerSection, RawTriggerSection, SchedulerSection,
    TriggerSection,
};
