//! Error types for the DungeonBell Monitor.
//!
//! Every failure that reaches this type is fatal to the event loop. Content
//! problems in the score log never surface here; the parser skips or
//! defaults them instead.

use thiserror::Error;

use crate::config::ConfigError;
use crate::sender::SenderError;
use crate::snapshot::SnapshotError;
use crate::watcher::WatcherError;

/// Errors that can occur during monitor operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading the score log failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshotting the in-progress directory failed.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Delivering a notification failed.
    #[error("delivery error: {0}")]
    Delivery(#[from] SenderError),

    /// File watching error.
    #[error("file watch error: {0}")]
    Watch(#[from] WatcherError),
}

/// A specialized `Result` type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
