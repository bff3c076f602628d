use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// How an outbound trigger message is delivered.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// To the single configured private recipient.
    Push,
    /// To all subscribers of the bot channel.
    Broadcast,
}

/// One automation trigger: an event name mapped to a fixed outbound text.
#[derive(Debug, Deserialize, Clone)]
pub struct Trigger {
    pub event: String,
    pub text: String,
    #[serde(default = "default_delivery")]
    pub delivery: Delivery,
}

/// Dispatch rules for both webhooks: the automation trigger table and the
/// nickname set the bot answers to. Built-in defaults cover the home setup;
/// a TOML file can swap in different event names or broadcast delivery
/// without touching code.
#[derive(Debug, Deserialize, Clone)]
pub struct Rules {
    #[serde(default = "default_triggers")]
    pub triggers: Vec<Trigger>,
    #[serde(default = "default_nicknames")]
    pub nicknames: Vec<String>,
    #[serde(default = "default_reply_text")]
    pub reply_text: String,
}

fn default_delivery() -> Delivery {
    Delivery::Push
}

fn default_triggers() -> Vec<Trigger> {
    vec![
        Trigger {
            event: "finish-cleaning".to_string(),
            text: "掃除おわった".to_string(),
            delivery: Delivery::Push,
        },
        Trigger {
            event: "be-stuck".to_string(),
            text: "たす...け...て......".to_string(),
            delivery: Delivery::Push,
        },
    ]
}

fn default_nicknames() -> Vec<String> {
    ["ルンちゃん", "るんちゃん", "ルンさん", "るんさん"]
        .map(str::to_string)
        .to_vec()
}

fn default_reply_text() -> String {
    "ほい".to_string()
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            triggers: default_triggers(),
            nicknames: default_nicknames(),
            reply_text: default_reply_text(),
        }
    }
}

impl Rules {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse rules file: {}", path.display()))
    }

    /// Loads from `path` when one is configured, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// First trigger whose event name matches exactly. Unknown names are
    /// not an error; the caller simply does nothing.
    pub fn trigger_for(&self, event: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.event == event)
    }

    /// First nickname contained anywhere in `text`, in table order.
    pub fn matching_nickname<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.nicknames
            .iter()
            .map(String::as_str)
            .find(|nickname| text.contains(nickname))
    }
}
