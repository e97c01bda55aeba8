// src/trigger/spool.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind};
use notify::{Config, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::Scheduler;
use crate::errors::{BackblastError, Result};
use crate::trigger::event_file::{is_event_file, parse_event_file};

/// Suffix appended to event files that failed to parse.
const REJECTED_SUFFIX: &str = "rejected";

/// Handle for the spool watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops
/// watching. The ingest task ends once the watcher is gone.
pub struct SpoolHandle {
    _inner: RecommendedWatcher,
    dir: PathBuf,
}

impl SpoolHandle {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl std::fmt::Debug for SpoolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoolHandle").field("dir", &self.dir).finish()
    }
}

/// Watch `dir` for event files and feed them to `scheduler`.
///
/// Files already present are ingested first, in file-name order. After that,
/// files are picked up when created, renamed into the directory, or closed
/// after writing. Writers should create the file under another name and
/// rename it to `*.toml` when complete.
pub fn spawn_spool_watcher(dir: impl Into<PathBuf>, scheduler: Scheduler) -> Result<SpoolHandle> {
    let dir = dir.into();
    if !dir.is_dir() {
        return Err(BackblastError::ConfigError(format!(
            "spool directory {:?} does not exist",
            dir
        )));
    }
    let dir = dir.canonicalize().unwrap_or(dir);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<NotifyEvent>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<NotifyEvent>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("backblast: failed to forward spool event: {err}");
                }
            }
            Err(err) => {
                eprintln!("backblast: spool watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    info!(spool = ?dir, "spool watcher started");

    // Listed after the watch is armed so nothing slips between the two.
    let backlog = pending_event_files(&dir)?;

    tokio::spawn(async move {
        if !backlog.is_empty() {
            info!(files = backlog.len(), "ingesting spooled event files");
        }
        for path in backlog {
            ingest_event_file(&path, &scheduler);
        }

        while let Some(event) = event_rx.recv().await {
            if !is_ingest_trigger(&event.kind) {
                continue;
            }
            debug!(?event, "received spool event");

            for path in event.paths {
                if !is_event_file(&path) {
                    continue;
                }
                if matches!(event.kind, EventKind::Create(_)) && is_empty_file(&path) {
                    // Still being written; the close-after-write event follows.
                    continue;
                }
                ingest_event_file(&path, &scheduler);
            }
        }
        debug!("spool watcher loop finished");
    });

    Ok(SpoolHandle {
        _inner: watcher,
        dir,
    })
}

/// Event files currently in `dir`, sorted by file name.
pub fn pending_event_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_event_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read, remove and enqueue one event file.
///
/// Returns whether an event reached the scheduler's queue. Files that fail to
/// parse are renamed to `<name>.rejected` so they are not retried.
pub fn ingest_event_file(path: &Path, scheduler: &Scheduler) -> bool {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(file = ?path, "event file already ingested");
            return false;
        }
        Err(err) => {
            warn!(file = ?path, error = %err, "failed to read event file");
            return false;
        }
    };

    let event = match parse_event_file(&contents) {
        Ok(event) => event,
        Err(err) => {
            warn!(file = ?path, error = %err, "rejecting malformed event file");
            reject(path);
            return false;
        }
    };

    if let Err(err) = fs::remove_file(path) {
        if err.kind() == ErrorKind::NotFound {
            // Another ingest of the same file won the race.
            return false;
        }
        warn!(file = ?path, error = %err, "failed to remove ingested event file");
    }

    info!(
        file = ?path,
        event_type = ?event.event_type,
        change = %event.change.id,
        "add trigger event"
    );
    scheduler.add_event(event)
}

fn reject(path: &Path) {
    let mut rejected = path.as_os_str().to_owned();
    rejected.push(".");
    rejected.push(REJECTED_SUFFIX);
    if let Err(err) = fs::rename(path, &rejected) {
        warn!(file = ?path, error = %err, "failed to set aside rejected event file");
    }
}

fn is_ingest_trigger(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(CreateKind::File | CreateKind::Any)
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Access(AccessKind::Close(AccessMode::Write))
    )
}

fn is_empty_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}
