// src/launch/mod.rs

//! Launch layer.
//!
//! The scheduler hands every dequeued change to a [`Launcher`] and never looks
//! at the outcome beyond logging it.
//!
//! - [`backend`] provides the `Launcher` trait.
//! - [`command`] provides `CommandLauncher`, which runs the configured shell
//!   command once per change using `tokio::process::Command`.

pub mod backend;
pub mod command;

pub use backend::{LaunchFuture, Launcher};
pub use command::{CHANGE_ID_ENV, CommandLauncher, PARAM_ENV_PREFIX, param_env_name};
