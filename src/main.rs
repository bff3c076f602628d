mod config;
mod line;
mod rules;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::line::LineClient;
use crate::rules::Rules;
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,runchan_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let rules = Rules::load_or_default(config.rules_path.as_deref())
        .context("Failed to load dispatch rules")?;

    info!("Configuration loaded");
    info!("  Triggers: {}", rules.triggers.len());
    info!("  Nicknames: {}", rules.nicknames.len());

    // Construct the messaging client. Without credentials nothing can be
    // sent, so this is the one deliberate fatal-on-startup path.
    let client = match LineClient::new(&config.line) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to construct LINE client: {:#}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(Arc::new(client), config.line.channel_secret.clone(), rules);
    let app = server::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Listening on port {}", config.port);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
