//! DungeonBell Monitor - game server session and score log notifier.
//!
//! This binary watches a game server's in-progress directory and score log
//! and posts start, finish and new-game messages to a webhook.
//!
//! # Commands
//!
//! - `dungeonbell-monitor run`: Start the monitor daemon
//! - `dungeonbell-monitor scan`: Print the current state once and exit
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dungeonbell_monitor::config::Config;
use dungeonbell_monitor::sender::WebhookSender;
use dungeonbell_monitor::tracker::ChangeTracker;
use dungeonbell_monitor::types::Notification;
use dungeonbell_monitor::watcher::{FileWatcher, WatchEvent};

/// Default number of recent records shown by `scan`.
const DEFAULT_SCAN_LIMIT: usize = 5;

/// DungeonBell Monitor - game server session and score log notifier.
///
/// Watches the in-progress directory and score log of a game server and
/// posts transitions to a webhook.
#[derive(Parser, Debug)]
#[command(name = "dungeonbell-monitor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    IN_PROGRESS_DIR                   In-progress directory (required)
    RECORD_FILE_NAME                  Score log file (required)
    WEBHOOK_URL                       Webhook endpoint (required)
    AVATAR_URL                        Avatar for posted messages
    USER_NAME                         Display name (default: hostname)
    SERVER_DOMAIN                     Host for live viewing (default: localhost)
    DUNGEONBELL_EVENT_BUFFER          File event queue size (default: 1000)
    DUNGEONBELL_REQUEST_TIMEOUT_SECS  Webhook timeout (default: 30)

EXAMPLES:
    # Check paths and log format without posting anything
    dungeonbell-monitor scan

    # Start the monitor
    export IN_PROGRESS_DIR=/opt/nethack/dgldir/inprogress-nh343
    export RECORD_FILE_NAME=/opt/nethack/nh343/var/logfile
    export WEBHOOK_URL=https://discord.com/api/webhooks/...
    dungeonbell-monitor run
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the monitor daemon.
    ///
    /// Takes an initial snapshot, then posts every transition until
    /// interrupted or until an error occurs.
    Run,

    /// Print active players and recent games, then exit.
    ///
    /// Nothing is posted to the webhook.
    Scan {
        /// Number of most recent games to show.
        #[arg(short, long, default_value_t = DEFAULT_SCAN_LIMIT)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    match cli.command {
        Command::Run => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;

            runtime.block_on(run_monitor())
        }
        Command::Scan { limit } => run_scan(limit),
    }
}

/// Runs the scan command.
fn run_scan(limit: usize) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let tracker = ChangeTracker::initialize(&config).context("Failed to load initial state")?;

    println!("Active players ({}):", tracker.active_users().len());
    for name in tracker.active_users() {
        println!("  {name}");
    }

    let records = tracker.records();
    println!();
    println!("Games in score log: {}", records.len());
    for record in &records[records.len().saturating_sub(limit)..] {
        let message = Notification::NewGame(record.clone()).content(&config.server_domain);
        println!("  {message}");
    }

    Ok(())
}

/// Runs the monitor daemon.
async fn run_monitor() -> Result<()> {
    info!("Starting DungeonBell Monitor");

    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        in_progress_dir = %config.in_progress_dir.display(),
        record_file = %config.record_file.display(),
        server_domain = %config.server_domain,
        "Configuration loaded"
    );

    let mut tracker =
        ChangeTracker::initialize(&config).context("Failed to load initial state")?;
    let mut sender = WebhookSender::new(&config).context("Failed to create webhook client")?;

    let (watch_tx, mut watch_rx) = mpsc::channel::<WatchEvent>(config.event_buffer);
    let _watcher = FileWatcher::new(&config, watch_tx).context(format!(
        "Failed to watch {} and {}",
        config.in_progress_dir.display(),
        config.record_file.display()
    ))?;

    info!("Monitor running. Press Ctrl+C to stop.");

    tracker
        .run(&mut watch_rx, &mut sender, wait_for_shutdown())
        .await
        .context("Monitor stopped on error")?;

    info!("Monitor stopped");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
