// src/trigger/event_file.rs

//! Event file format.
//!
//! ```toml
//! type = "change-created"
//!
//! [change]
//! id = "4711"
//!
//! [change.params]
//! number = "555-0100"
//! ```
//!
//! A missing or blank `type` yields an event without a type, which the
//! scheduler drops (it still wakes the worker).

use std::path::Path;

use serde::Deserialize;

use crate::engine::{Change, Event};
use crate::errors::{BackblastError, Result};

pub const EVENT_FILE_EXTENSION: &str = "toml";

#[derive(Debug, Deserialize)]
struct RawEventFile {
    #[serde(rename = "type", default)]
    event_type: Option<String>,
    change: Change,
}

pub fn parse_event_file(contents: &str) -> Result<Event> {
    let raw: RawEventFile = toml::from_str(contents)?;

    if raw.change.id.trim().is_empty() {
        return Err(BackblastError::EventFileError(
            "[change].id must not be empty".to_string(),
        ));
    }

    let event_type = raw
        .event_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(Event {
        event_type,
        change: raw.change,
    })
}

/// Whether `path` names an event file (by extension only).
pub fn is_event_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == EVENT_FILE_EXTENSION)
        .unwrap_or(false)
}
