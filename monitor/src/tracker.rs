//! Change tracker and event loop.
//!
//! [`ChangeTracker`] holds the two pieces of rolling state, the players last
//! seen in the in-progress directory and the score log records already
//! reported, and turns each [`WatchEvent`] into the notifications it implies.
//!
//! | Event | Reaction |
//! |-------|----------|
//! | create in the in-progress directory | re-snapshot, `Started` if the file's player was not already active |
//! | remove in the in-progress directory | re-snapshot, `Finished` for every player who disappeared |
//! | write to the score log | re-parse, `NewGame` for every record not seen before |
//! | anything else | ignored |
//!
//! [`ChangeTracker::run`] drives the tracker from a channel, handling one event
//! at a time and delivering its notifications before pulling the next. Any
//! error ends the loop.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::diff;
use crate::error::Result;
use crate::parser;
use crate::sender::Deliver;
use crate::snapshot;
use crate::types::{Notification, SessionRecord};
use crate::watcher::{WatchEvent, WatchKind};

/// Rolling state of the monitor.
#[derive(Debug)]
pub struct ChangeTracker {
    in_progress_dir: PathBuf,
    record_file: PathBuf,
    last_records: Vec<SessionRecord>,
    last_active_users: BTreeSet<String>,
}

impl ChangeTracker {
    /// Takes the initial snapshot of the score log and the in-progress directory.
    ///
    /// Nothing that exists at startup is ever reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the score log cannot be read or the directory
    /// cannot be listed.
    pub fn initialize(config: &Config) -> Result<Self> {
        let last_records = parser::parse_log(&config.record_file)?;
        let last_active_users = snapshot::active_users(&config.in_progress_dir)?;

        info!(
            record_count = last_records.len(),
            active_count = last_active_users.len(),
            "Initial state loaded"
        );

        Ok(Self {
            in_progress_dir: config.in_progress_dir.clone(),
            record_file: config.record_file.clone(),
            last_records,
            last_active_users,
        })
    }

    /// Players considered active as of the last directory snapshot.
    #[must_use]
    pub fn active_users(&self) -> &BTreeSet<String> {
        &self.last_active_users
    }

    /// Every record seen so far, in the order it was first seen.
    #[must_use]
    pub fn records(&self) -> &[SessionRecord] {
        &self.last_records
    }

    /// Applies one file system event and returns the notifications it produces.
    ///
    /// # Errors
    ///
    /// Returns an error if re-reading the score log or re-listing the
    /// directory fails.
    pub fn handle(&mut self, event: &WatchEvent) -> Result<Vec<Notification>> {
        trace!(kind = ?event.kind, path = %event.path.display(), "Handling event");

        let mut notifications = Vec::new();

        if event.path.parent() == Some(self.in_progress_dir.as_path()) {
            notifications.extend(self.on_session_event(event)?);
        }

        if event.kind == WatchKind::Write && event.path == self.record_file {
            notifications.extend(self.on_log_written()?);
        }

        Ok(notifications)
    }

    fn on_session_event(&mut self, event: &WatchEvent) -> Result<Vec<Notification>> {
        let Some(name) = snapshot::player_name(&event.path)? else {
            trace!(path = %event.path.display(), "Ignoring lock file");
            return Ok(Vec::new());
        };

        match event.kind {
            WatchKind::Create => {
                let already_active = self.last_active_users.contains(&name);
                self.last_active_users = snapshot::active_users(&self.in_progress_dir)?;

                if already_active {
                    debug!(player = %name, "Additional artifact for active player");
                    return Ok(Vec::new());
                }

                info!(player = %name, "Session started");
                Ok(vec![Notification::Started { name }])
            }
            WatchKind::Remove => {
                let current = snapshot::active_users(&self.in_progress_dir)?;
                let finished = diff::finished_users(&self.last_active_users, &current);
                self.last_active_users = current;

                for player in &finished {
                    info!(player = %player, "Session finished");
                }

                Ok(finished
                    .into_iter()
                    .map(|name| Notification::Finished { name })
                    .collect())
            }
            WatchKind::Write | WatchKind::Other => Ok(Vec::new()),
        }
    }

    fn on_log_written(&mut self) -> Result<Vec<Notification>> {
        let records = parser::parse_log(&self.record_file)?;
        let new = diff::new_records(&self.last_records, &records);

        if new.is_empty() {
            debug!("No new records found");
            return Ok(Vec::new());
        }

        info!(new_count = new.len(), "New records found");
        self.last_records.extend(new.iter().cloned());

        Ok(new.into_iter().map(Notification::NewGame).collect())
    }

    /// Consumes events until `shutdown` resolves or the channel closes.
    ///
    /// Shutdown is only observed between events; an event that has been
    /// pulled is always handled and delivered to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error from handling an event or delivering one of
    /// its notifications.
    pub async fn run<D, S>(
        &mut self,
        events: &mut mpsc::Receiver<WatchEvent>,
        sink: &mut D,
        shutdown: S,
    ) -> Result<()>
    where
        D: Deliver,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("Shutdown signal received");
                    return Ok(());
                }

                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Event source closed");
                        return Ok(());
                    };

                    for notification in self.handle(&event)? {
                        sink.deliver(&notification).await?;
                    }
                }
            }
        }
    }
}
