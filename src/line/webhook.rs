use serde::Deserialize;
use thiserror::Error;

use crate::line::signature;

/// Failure classes for inbound webhook parsing. The server maps
/// `InvalidSignature` to 400 and `Malformed` to 500.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed webhook body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Top-level webhook payload. LINE delivers one or more events per request.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// A single webhook event, tagged by `type`. Only message events carry
/// anything the bot acts on; everything else (follow, unfollow, postback,
/// join, ...) collapses into `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "message")]
    Message {
        #[serde(rename = "replyToken")]
        reply_token: String,
        message: MessageContent,
    },
    #[serde(other)]
    Other,
}

/// Message payload, tagged by `type`. Non-text messages (stickers, images,
/// location, ...) collapse into `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum MessageContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Verifies the request signature and decodes the event envelope.
///
/// A missing header counts as an invalid signature: the platform always
/// sends one, so its absence means the request did not come from LINE.
pub fn parse(
    secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<Vec<Event>, WebhookError> {
    let signature = signature.ok_or(WebhookError::InvalidSignature)?;
    if !signature::verify(secret, signature, body) {
        return Err(WebhookError::InvalidSignature);
    }
    let envelope: Envelope = serde_json::from_slice(body)?;
    Ok(envelope.events)
}
