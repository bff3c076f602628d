use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::LineConfig;

const API_BASE: &str = "https://api.line.me";

/// Outbound messaging operations. Handlers depend on this trait rather than
/// the concrete client so tests can substitute a recording double.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends `text` to the configured private recipient.
    async fn push(&self, text: &str) -> Result<()>;

    /// Sends `text` bound to a one-time reply token from an inbound event.
    async fn reply(&self, text: &str, reply_token: &str) -> Result<()>;

    /// Sends `text` to all subscribers of the bot channel.
    async fn broadcast(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct TextMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl TextMessage {
    fn new(text: &str) -> Self {
        Self {
            kind: "text",
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PushRequest {
    to: String,
    messages: Vec<TextMessage>,
}

#[derive(Debug, Serialize)]
struct ReplyRequest {
    #[serde(rename = "replyToken")]
    reply_token: String,
    messages: Vec<TextMessage>,
}

#[derive(Debug, Serialize)]
struct BroadcastRequest {
    messages: Vec<TextMessage>,
}

/// Messaging API client holding the channel credentials and the push target.
pub struct LineClient {
    http: reqwest::Client,
    channel_token: String,
    push_to: String,
}

impl LineClient {
    /// Builds the client. Fails when either channel credential is missing,
    /// which callers treat as fatal at startup.
    pub fn new(config: &LineConfig) -> Result<Self> {
        if config.channel_token.is_empty() {
            anyhow::bail!("LINE channel token is not set");
        }
        if config.channel_secret.is_empty() {
            anyhow::bail!("LINE channel secret is not set");
        }
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            channel_token: config.channel_token.clone(),
            push_to: config.push_to.clone(),
        })
    }

    async fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<()> {
        let url = format!("{API_BASE}{path}");

        debug!("Sending request to LINE: {}", url);

        let response = self
            .http
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.channel_token),
            )
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("LINE API error ({}): {}", status, error_body);
        }

        Ok(())
    }
}

#[async_trait]
impl MessageSender for LineClient {
    async fn push(&self, text: &str) -> Result<()> {
        let request = PushRequest {
            to: self.push_to.clone(),
            messages: vec![TextMessage::new(text)],
        };
        self.post("/v2/bot/message/push", &request).await
    }

    async fn reply(&self, text: &str, reply_token: &str) -> Result<()> {
        let request = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![TextMessage::new(text)],
        };
        self.post("/v2/bot/message/reply", &request).await
    }

    async fn broadcast(&self, text: &str) -> Result<()> {
        let request = BroadcastRequest {
            messages: vec![TextMessage::new(text)],
        };
        self.post("/v2/bot/message/broadcast", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line_config(token: &str, secret: &str) -> LineConfig {
        LineConfig {
            channel_token: token.to_string(),
            channel_secret: secret.to_string(),
            push_to: "U-private".to_string(),
        }
    }

    #[test]
    fn test_new_rejects_missing_token() {
        assert!(LineClient::new(&line_config("", "secret")).is_err());
    }

    #[test]
    fn test_new_rejects_missing_secret() {
        assert!(LineClient::new(&line_config("token", "")).is_err());
    }

    #[test]
    fn test_new_with_credentials() {
        assert!(LineClient::new(&line_config("token", "secret")).is_ok());
    }

    #[test]
    fn test_push_payload_shape() {
        let request = PushRequest {
            to: "U-private".to_string(),
            messages: vec![TextMessage::new("掃除おわった")],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "to": "U-private",
                "messages": [{"type": "text", "text": "掃除おわった"}]
            })
        );
    }

    #[test]
    fn test_reply_payload_shape() {
        let request = ReplyRequest {
            reply_token: "token-1".to_string(),
            messages: vec![TextMessage::new("ほい")],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "replyToken": "token-1",
                "messages": [{"type": "text", "text": "ほい"}]
            })
        );
    }

    #[test]
    fn test_broadcast_payload_shape() {
        let request = BroadcastRequest {
            messages: vec![TextMessage::new("たす...け...て......")],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "messages": [{"type": "text", "text": "たす...け...て......"}]
            })
        );
    }
}
