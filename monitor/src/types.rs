//! Core data types for DungeonBell.
//!
//! This module defines the completed-game record parsed from the score log,
//! the transitions the monitor reports, and the JSON body posted to the
//! webhook.

use serde::{Deserialize, Serialize};

/// One completed game, parsed from a single line of the score log.
///
/// Equality is structural across every field: two records are the same game
/// only if all sixteen fixed fields and the result text match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    pub game_version: String,
    pub score: i64,
    pub dungeon_id: i64,
    pub dungeon_level: i64,
    pub max_dungeon_level: i64,
    pub hp: i64,
    pub max_hp: i64,
    /// Reserved column, carried for equality only.
    pub unused1: i64,
    pub end_date: i64,
    pub start_date: i64,
    /// Reserved column, carried for equality only.
    pub unused2: i64,
    pub class: String,
    pub race: String,
    pub gender: String,
    pub alignment: String,
    pub name: String,
    /// Free-text description of how the game ended.
    pub result: String,
}

/// A detected state transition worth telling the channel about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A session artifact appeared for this player.
    Started { name: String },

    /// The player no longer has any session artifact.
    Finished { name: String },

    /// A new completed game was appended to the score log.
    NewGame(SessionRecord),
}

/// JSON body accepted by the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    pub content: String,
    /// Always empty; rich embeds are never sent.
    pub embeds: Vec<serde_json::Value>,
    pub tts: bool,
}

impl WebhookPayload {
    /// Creates a plain-text payload with no embeds and text-to-speech off.
    #[must_use]
    pub fn new(username: String, avatar_url: String, content: String) -> Self {
        Self {
            username,
            avatar_url,
            content,
            embeds: Vec::new(),
            tts: false,
        }
    }
}
