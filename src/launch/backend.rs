// src/launch/backend.rs

//! Pluggable launcher abstraction.
//!
//! Production code uses [`CommandLauncher`](super::CommandLauncher); tests
//! provide launchers that record what they were given.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::engine::Change;
use crate::errors::Result;

pub type LaunchFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Performs the side-effecting work for one dispatched change.
///
/// `config` is the snapshot that was active when the change was dequeued.
/// Errors (and panics) are caught and logged by the scheduler; they never
/// affect other queued changes and are never retried.
pub trait Launcher: Send + Sync {
    fn launch(&self, change: Change, config: Arc<ConfigFile>) -> LaunchFuture<'_>;
}
