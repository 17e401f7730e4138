//! DungeonBell Monitor - game server session and score log notifier.
//!
//! This crate watches a game server's in-progress directory and score log
//! and posts a chat message whenever a player starts or finishes a game, or
//! a completed game is appended to the log.
//!
//! # Overview
//!
//! The server keeps one or more `<player>:<suffix>` files in the in-progress
//! directory while a player is connected, and appends one line per finished
//! game to the score log. The monitor keeps the last observed state of both
//! and reports only transitions, each at most once.
//!
//! # Modules
//!
//! - [`types`]: Session records, notifications and the webhook payload
//! - [`parser`]: Score log parsing
//! - [`snapshot`]: Active-player snapshots of the in-progress directory
//! - [`diff`]: Differencing of successive snapshots
//! - [`notification`]: Message formatting
//! - [`sender`]: Webhook delivery
//! - [`watcher`]: File system event source
//! - [`tracker`]: Rolling state and the event loop
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types for monitor operations

pub mod config;
pub mod diff;
pub mod error;
pub mod notification;
pub mod parser;
pub mod sender;
pub mod snapshot;
pub mod tracker;
pub mod types;
pub mod watcher;

pub use config::Config;
pub use error::{MonitorError, Result};
pub use sender::{Deliver, SenderError, WebhookSender};
pub use tracker::ChangeTracker;
pub use types::{Notification, SessionRecord, WebhookPayload};
pub use watcher::{FileWatcher, WatchEvent, WatchKind};
