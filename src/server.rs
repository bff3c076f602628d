//! Webhook HTTP server.
//!
//! Binds two endpoints: `/bot/webhook` receives signed LINE message events
//! and answers when the bot is called by a nickname; `/bot/ifttt` receives
//! automation trigger payloads (`{"event": "<name>"}`) and relays the
//! mapped text as a push or broadcast message.  Outbound send failures are
//! logged and never change the HTTP response.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    routing::any,
    Router,
};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::line::webhook::{self, Event, MessageContent, WebhookError};
use crate::line::MessageSender;
use crate::rules::{Delivery, Rules};

/// Inbound request bodies are tiny; anything larger is not ours.
const BODY_LIMIT: usize = 1024 * 1024;

// ── Shared state ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    sender: Arc<dyn MessageSender>,
    channel_secret: String,
    rules: Arc<Rules>,
}

impl AppState {
    pub fn new(sender: Arc<dyn MessageSender>, channel_secret: String, rules: Rules) -> Self {
        Self {
            sender,
            channel_secret,
            rules: Arc::new(rules),
        }
    }
}

// ── Request types ──────────────────────────────────────────────────────────────

/// Automation trigger payload. A missing `event` field decodes to an empty
/// name, which matches no trigger and is silently ignored.
#[derive(Debug, Deserialize)]
struct IftttRequest {
    #[serde(default)]
    event: String,
}

// ── Router ─────────────────────────────────────────────────────────────────────

/// Routes accept any method: the webhook endpoint lets signature
/// verification reject unsigned requests, the trigger endpoint checks the
/// method itself so it can answer 400 instead of 405. Unknown paths hit the
/// router's 404 fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/bot/webhook", any(webhook_handler))
        .route("/bot/ifttt", any(ifttt_handler))
        .with_state(state)
}

// ── Handlers ───────────────────────────────────────────────────────────────────

async fn webhook_handler(State(state): State<AppState>, request: Request) -> StatusCode {
    let (parts, body) = request.into_parts();
    let signature = parts
        .headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok());

    let body = match to_bytes(body, BODY_LIMIT).await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to read webhook body: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let events = match webhook::parse(&state.channel_secret, signature, &body) {
        Ok(events) => events,
        Err(e @ WebhookError::InvalidSignature) => {
            error!("Invalid webhook signature: {}", e);
            return StatusCode::BAD_REQUEST;
        }
        Err(e) => {
            error!("Failed to parse webhook request: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    for event in &events {
        let Event::Message {
            reply_token,
            message: MessageContent::Text { text },
        } = event
        else {
            continue;
        };

        if let Some(nickname) = state.rules.matching_nickname(text) {
            info!("Nickname {} matched, replying", nickname);
            if let Err(e) = state.sender.reply(&state.rules.reply_text, reply_token).await {
                error!("Failed to send a reply message: {:#}", e);
            }
            // The first match answers for the whole batch; remaining
            // events are intentionally skipped.
            return StatusCode::OK;
        }
    }

    StatusCode::OK
}

async fn ifttt_handler(State(state): State<AppState>, request: Request) -> StatusCode {
    if request.method() != Method::POST {
        error!("Invalid method: {}", request.method());
        return StatusCode::BAD_REQUEST;
    }

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if content_type != Some("application/json") {
        error!("Invalid content type");
        return StatusCode::BAD_REQUEST;
    }

    let body = match to_bytes(request.into_body(), BODY_LIMIT).await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to read trigger body: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let body: IftttRequest = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to decode trigger body: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    match state.rules.trigger_for(&body.event) {
        Some(trigger) => {
            info!("Trigger matched for event {}", body.event);
            let sent = match trigger.delivery {
                Delivery::Push => state.sender.push(&trigger.text).await,
                Delivery::Broadcast => state.sender.broadcast(&trigger.text).await,
            };
            if let Err(e) = sent {
                error!("Failed to send a trigger message: {:#}", e);
            }
        }
        None => debug!("No trigger for event {:?}", body.event),
    }

    StatusCode::OK
}

// ── Tests ──────────────────────────────────────────────────────────────────────
