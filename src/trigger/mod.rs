// src/trigger/mod.rs

//! Event producers.
//!
//! This module turns external triggers into [`Event`](crate::engine::Event)s
//! for `Scheduler::add_event`:
//! - [`event_file`] parses the TOML event file format.
//! - [`spool`] watches a spool directory (`notify`) and ingests event files
//!   dropped into it.

pub mod event_file;
pub mod spool;

pub use event_file::{EVENT_FILE_EXTENSION, is_event_file, parse_event_file};
pub use spool::{SpoolHandle, ingest_event_file, pending_event_files, spawn_spool_watcher};
