//! File system event source for the change tracker.
//!
//! This module watches the in-progress directory and the score log and turns
//! raw [`notify`] events into one [`WatchEvent`] per affected path.
//!
//! # Architecture
//!
//! The notify callback runs on notify's own thread. It only classifies the
//! event and forwards it with `try_send` into a bounded tokio channel; all
//! file I/O happens in the consumer. If the consumer falls behind and the
//! channel fills up, events are dropped with a warning.
//!
//! # Example
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use dungeonbell_monitor::config::Config;
//! use dungeonbell_monitor::watcher::FileWatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let (tx, mut rx) = mpsc::channel(config.event_buffer);
//!     let _watcher = FileWatcher::new(&config, tx)?;
//!
//!     while let Some(event) = rx.recv().await {
//!         println!("{:?} {}", event.kind, event.path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// The kind of change observed on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// A file was created.
    Create,
    /// File contents changed.
    Write,
    /// A file was removed.
    Remove,
    /// Renames, metadata changes, access and anything else.
    Other,
}

/// A single file system change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path the change happened to.
    pub path: PathBuf,
    /// What happened.
    pub kind: WatchKind,
}

impl WatchEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: WatchKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Errors that can occur during file watching operations.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to initialize the file system watcher or add a watch.
    #[error("failed to create watcher: {0}")]
    WatcherInit(#[from] notify::Error),

    /// The watched directory does not exist.
    #[error("watch directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),
}

/// Watches the in-progress directory and the score log.
///
/// Dropping the `FileWatcher` stops the watch.
#[derive(Debug)]
pub struct FileWatcher {
    /// Kept alive to maintain the watch subscription.
    #[allow(dead_code)]
    watcher: RecommendedWatcher,

    in_progress_dir: PathBuf,
}

impl FileWatcher {
    /// Starts watching the paths named in `config`.
    ///
    /// The in-progress directory is watched non-recursively; only changes to
    /// its direct children are reported.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The in-progress directory does not exist
    /// - The file system watcher cannot be initialized
    /// - Either path cannot be watched
    pub fn new(
        config: &crate::config::Config,
        event_sender: mpsc::Sender<WatchEvent>,
    ) -> Result<Self, WatcherError> {
        if !config.in_progress_dir.is_dir() {
            return Err(WatcherError::DirectoryNotFound(
                config.in_progress_dir.clone(),
            ));
        }

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| handle_notify_event(res, &event_sender),
            Config::default(),
        )?;

        watcher.watch(&config.in_progress_dir, RecursiveMode::NonRecursive)?;
        watcher.watch(&config.record_file, RecursiveMode::NonRecursive)?;

        info!(
            in_progress_dir = %config.in_progress_dir.display(),
            record_file = %config.record_file.display(),
            "Initialized file watcher"
        );

        Ok(Self {
            watcher,
            in_progress_dir: config.in_progress_dir.clone(),
        })
    }

    /// Returns the watched in-progress directory.
    #[must_use]
    pub fn in_progress_dir(&self) -> &Path {
        &self.in_progress_dir
    }
}

/// Maps a notify event kind onto the operations the tracker cares about.
#[must_use]
pub fn classify(kind: &EventKind) -> WatchKind {
    match kind {
        EventKind::Create(_) => WatchKind::Create,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => WatchKind::Write,
        EventKind::Remove(_) => WatchKind::Remove,
        _ => WatchKind::Other,
    }
}

/// Handles events from the notify crate.
///
/// Runs on the notify thread, so it never blocks.
fn handle_notify_event(res: notify::Result<Event>, tx: &mpsc::Sender<WatchEvent>) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "File watcher error");
            return;
        }
    };

    trace!(kind = ?event.kind, paths = ?event.paths, "Received notify event");

    let kind = classify(&event.kind);
    for path in event.paths {
        debug!(kind = ?kind, path = %path.display(), "Queueing watch event");
        if let Err(e) = tx.try_send(WatchEvent { path, kind }) {
            warn!(error = %e, "Failed to queue watch event, channel may be full");
        }
    }
}
