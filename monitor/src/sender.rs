//! Webhook delivery for DungeonBell Monitor.
//!
//! Each notification is posted as one JSON request. The endpoint answers a
//! successful post with `204 No Content`; anything else is a failure. There is
//! no buffering and no retry: a notification that fails to deliver is lost and
//! the caller decides what to do about the error.
//!
//! # Example
//!
//! ```no_run
//! use dungeonbell_monitor::config::Config;
//! use dungeonbell_monitor::sender::{Deliver, WebhookSender};
//! use dungeonbell_monitor::types::Notification;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let mut sender = WebhookSender::new(&config).unwrap();
//!
//!     let started = Notification::Started { name: "alice".to_string() };
//!     sender.deliver(&started).await.unwrap();
//! }
//! ```

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::types::Notification;

/// Errors that can occur during notification delivery.
#[derive(Error, Debug)]
pub enum SenderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with something other than `204 No Content`.
    #[error("unexpected status: {status} - {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A sink for notifications.
///
/// The event loop only depends on this trait, so it can be driven without a
/// live webhook.
pub trait Deliver {
    /// Delivers one notification, returning once the sink has accepted it.
    fn deliver(
        &mut self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), SenderError>> + Send;
}

/// Posts notifications to a webhook endpoint.
pub struct WebhookSender {
    config: Config,
    client: Client,
}

impl WebhookSender {
    /// Creates a sender for the webhook and display settings in `config`.
    ///
    /// Requests are bounded by `config.request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Http` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, SenderError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    async fn post(&self, notification: &Notification) -> Result<(), SenderError> {
        let payload = notification.to_payload(&self.config);
        let body = serde_json::to_string(&payload)?;

        debug!(url = %self.config.webhook_url, content = %payload.content, "Posting notification");

        let response = self
            .client
            .post(&self.config.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            info!(content = %payload.content, "Notification sent");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), message = %message, "Webhook rejected notification");

        Err(SenderError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        })
    }
}

impl Deliver for WebhookSender {
    async fn deliver(&mut self, notification: &Notification) -> Result<(), SenderError> {
        self.post(notification).await
    }
}
