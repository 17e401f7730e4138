//! Message formatting for detected transitions.

use crate::config::Config;
use crate::types::{Notification, WebhookPayload};

impl Notification {
    /// Renders the chat message for this transition.
    ///
    /// `server_domain` is only used by [`Notification::Started`], to tell
    /// readers where to watch the game live.
    #[must_use]
    pub fn content(&self, server_domain: &str) -> String {
        match self {
            Self::Started { name } => format!(
                "{name} started exploring.\n`$ telnet {server_domain}` to watch the game in progress!"
            ),
            Self::Finished { name } => format!("{name} finished exploring."),
            Self::NewGame(r) => format!(
                "{}({}-{}-{}) {}.(SCORE: {})",
                r.name, r.class, r.race, r.alignment, r.result, r.score
            ),
        }
    }

    /// Builds the webhook body using the display settings from `config`.
    #[must_use]
    pub fn to_payload(&self, config: &Config) -> WebhookPayload {
        WebhookPayload::new(
            config.user_name.clone(),
            config.avatar_url.clone(),
            self.content(&config.server_domain),
        )
    }
}
