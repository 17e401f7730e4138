//! Configuration module for DungeonBell Monitor.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `IN_PROGRESS_DIR` | Yes | - | Directory holding per-player session artifacts |
//! | `RECORD_FILE_NAME` | Yes | - | Score log file |
//! | `WEBHOOK_URL` | Yes | - | Webhook endpoint notifications are posted to |
//! | `AVATAR_URL` | No | (empty) | Avatar shown on posted messages |
//! | `USER_NAME` | No | hostname | Display name shown on posted messages |
//! | `SERVER_DOMAIN` | No | `localhost` | Host advertised in "started exploring" messages |
//! | `DUNGEONBELL_EVENT_BUFFER` | No | 1000 | File event queue capacity |
//! | `DUNGEONBELL_REQUEST_TIMEOUT_SECS` | No | 30 | Webhook request timeout |
//!
//! # Example
//!
//! ```no_run
//! use dungeonbell_monitor::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Watching: {}", config.in_progress_dir.display());
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default file event queue capacity.
const DEFAULT_EVENT_BUFFER: usize = 1000;

/// Default webhook request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default host advertised for live viewing.
const DEFAULT_SERVER_DOMAIN: &str = "localhost";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Configuration for the DungeonBell Monitor.
///
/// Built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose files mark active sessions.
    pub in_progress_dir: PathBuf,

    /// Append-only score log.
    pub record_file: PathBuf,

    /// Webhook endpoint URL.
    pub webhook_url: String,

    /// Avatar URL for posted messages.
    pub avatar_url: String,

    /// Display name for posted messages.
    pub user_name: String,

    /// Host substituted into the "started exploring" message.
    pub server_domain: String,

    /// Capacity of the file event channel.
    pub event_buffer: usize,

    /// Upper bound on a single webhook request.
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `IN_PROGRESS_DIR`, `RECORD_FILE_NAME` or `WEBHOOK_URL` is unset or empty
    /// - `DUNGEONBELL_EVENT_BUFFER` or `DUNGEONBELL_REQUEST_TIMEOUT_SECS` is set
    ///   but is not a positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        let in_progress_dir = PathBuf::from(required("IN_PROGRESS_DIR")?);
        let record_file = PathBuf::from(required("RECORD_FILE_NAME")?);
        let webhook_url = required("WEBHOOK_URL")?;

        let avatar_url = env::var("AVATAR_URL").unwrap_or_default();

        // Optional: USER_NAME (default: hostname)
        let user_name = env::var("USER_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(get_hostname);

        let server_domain = env::var("SERVER_DOMAIN")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_DOMAIN.to_string());

        let event_buffer = positive_or_default("DUNGEONBELL_EVENT_BUFFER", DEFAULT_EVENT_BUFFER)?;
        let timeout_secs = positive_or_default(
            "DUNGEONBELL_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            in_progress_dir,
            record_file,
            webhook_url,
            avatar_url,
            user_name,
            server_domain,
            event_buffer,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Creates a configuration for the given paths with default display settings.
    #[must_use]
    pub fn for_paths(
        in_progress_dir: impl Into<PathBuf>,
        record_file: impl Into<PathBuf>,
        webhook_url: impl Into<String>,
    ) -> Self {
        Self {
            in_progress_dir: in_progress_dir.into(),
            record_file: record_file.into(),
            webhook_url: webhook_url.into(),
            avatar_url: String::new(),
            user_name: get_hostname(),
            server_domain: DEFAULT_SERVER_DOMAIN.to_string(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Replaces the display name, avatar and advertised server domain.
    #[must_use]
    pub fn with_display(
        mut self,
        user_name: impl Into<String>,
        avatar_url: impl Into<String>,
        server_domain: impl Into<String>,
    ) -> Self {
        self.user_name = user_name.into();
        self.avatar_url = avatar_url.into();
        self.server_domain = server_domain.into();
        self
    }
}

/// Reads a required, non-empty environment variable.
fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Reads an optional positive integer, falling back to `default` when unset.
fn positive_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    match env::var(key) {
        Ok(val) => {
            let n = val.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected positive integer, got '{val}'"),
            })?;
            if n == T::default() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "value must be greater than 0".to_string(),
                });
            }
            Ok(n)
        }
        Err(_) => Ok(default),
    }
}

/// Gets the system hostname, falling back to "unknown" if it cannot be determined.
fn get_hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: &[&str] = &[
        "IN_PROGRESS_DIR",
        "RECORD_FILE_NAME",
        "WEBHOOK_URL",
        "AVATAR_URL",
        "USER_NAME",
        "SERVER_DOMAIN",
        "DUNGEONBELL_EVENT_BUFFER",
        "DUNGEONBELL_REQUEST_TIMEOUT_SECS",
    ];

    /// Helper to run tests with isolated environment variables.
    /// Clears every variable the monitor reads and restores them after.
    fn with_clean_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let saved_vars: Vec<(&str, String)> = VARS
            .iter()
            .filter_map(|k| env::var(k).ok().map(|v| (*k, v)))
            .collect();

        for key in VARS {
            env::remove_var(key);
        }

        let result = f();

        for key in VARS {
            env::remove_var(key);
        }
        for (key, value) in saved_vars {
            env::set_var(key, value);
        }

        result
    }

    fn set_required() {
        env::set_var("IN_PROGRESS_DIR", "/dgl/inprogress");
        env::set_var("RECORD_FILE_NAME", "/dgl/logfile");
        env::set_var("WEBHOOK_URL", "https://hooks.example.com/abc");
    }

    #[test]
    #[serial]
    fn test_missing_in_progress_dir() {
        with_clean_env(|| {
            env::set_var("RECORD_FILE_NAME", "/dgl/logfile");
            env::set_var("WEBHOOK_URL", "https://hooks.example.com/abc");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref s) if s == "IN_PROGRESS_DIR"));
        });
    }

    #[test]
    #[serial]
    fn test_empty_webhook_url_is_missing() {
        with_clean_env(|| {
            set_required();
            env::set_var("WEBHOOK_URL", "");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref s) if s == "WEBHOOK_URL"));
        });
    }

    #[test]
    #[serial]
    fn test_minimal_config() {
        with_clean_env(|| {
            set_required();

            let config = Config::from_env().expect("should parse minimal config");

            assert_eq!(config.in_progress_dir, PathBuf::from("/dgl/inprogress"));
            assert_eq!(config.record_file, PathBuf::from("/dgl/logfile"));
            assert_eq!(config.webhook_url, "https://hooks.example.com/abc");
            assert_eq!(config.avatar_url, "");
            assert!(!config.user_name.is_empty());
            assert_eq!(config.server_domain, DEFAULT_SERVER_DOMAIN);
            assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
            assert_eq!(
                config.request_timeout,
                Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
            );
        });
    }

    #[test]
    #[serial]
    fn test_full_config() {
        with_clean_env(|| {
            set_required();
            env::set_var("AVATAR_URL", "https://img.example.com/bell.png");
            env::set_var("USER_NAME", "DungeonBell");
            env::set_var("SERVER_DOMAIN", "nethack.example.org");
            env::set_var("DUNGEONBELL_EVENT_BUFFER", "64");
            env::set_var("DUNGEONBELL_REQUEST_TIMEOUT_SECS", "5");

            let config = Config::from_env().expect("should parse full config");

            assert_eq!(config.avatar_url, "https://img.example.com/bell.png");
            assert_eq!(config.user_name, "DungeonBell");
            assert_eq!(config.server_domain, "nethack.example.org");
            assert_eq!(config.event_buffer, 64);
            assert_eq!(config.request_timeout, Duration::from_secs(5));
        });
    }

    #[test]
    #[serial]
    fn test_invalid_event_buffer() {
        with_clean_env(|| {
            set_required();
            env::set_var("DUNGEONBELL_EVENT_BUFFER", "lots");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { ref key, .. } if key == "DUNGEONBELL_EVENT_BUFFER"
            ));
        });
    }

    #[test]
    #[serial]
    fn test_zero_timeout_rejected() {
        with_clean_env(|| {
            set_required();
            env::set_var("DUNGEONBELL_REQUEST_TIMEOUT_SECS", "0");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { ref key, ref message }
                    if key == "DUNGEONBELL_REQUEST_TIMEOUT_SECS" && message.contains("greater than 0")
            ));
        });
    }

    #[test]
    fn test_with_display_overrides() {
        let config = Config::for_paths("/a", "/b", "http://c").with_display("n", "i", "d");
        assert_eq!(config.user_name, "n");
        assert_eq!(config.avatar_url, "i");
        assert_eq!(config.server_domain, "d");
    }

    #[test]
    fn test_get_hostname() {
        assert!(!get_hostname().is_empty());
    }
}
