use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;

/// LINE channel credentials and the push recipient.
///
/// Values may be empty here; `LineClient::new` is where missing credentials
/// become a startup failure, matching where the platform SDK reports them.
#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_token: String,
    pub channel_secret: String,
    /// Recipient ID for push messages (a user or group ID).
    pub push_to: String,
}

/// Process configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub line: LineConfig,
    pub port: u16,
    /// Optional TOML rules file overriding the built-in dispatch rules.
    pub rules_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            line: LineConfig {
                channel_token: env_or_empty("LINE_BOT_TOKEN"),
                channel_secret: env_or_empty("LINE_BOT_SECRET"),
                push_to: env_or_empty("LINE_BOT_PRIVATE_ID"),
            },
            port: parse_port(std::env::var("PORT").ok().as_deref())?,
            rules_path: std::env::var("LINE_BOT_RULES")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn parse_port(value: Option<&str>) -> Result<u16> {
    match value {
        Some("") | None => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid PORT value: {raw}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_when_unset() {
        assert_eq!(parse_port(None).unwrap(), 8080);
    }

    #[test]
    fn test_port_defaults_when_empty() {
        assert_eq!(parse_port(Some("")).unwrap(), 8080);
    }

    #[test]
    fn test_port_parses_explicit_value() {
        assert_eq!(parse_port(Some("3000")).unwrap(), 3000);
    }

    #[test]
    fn test_port_rejects_garbage() {
        assert!(parse_port(Some("not-a-port")).is_err());
        assert!(parse_port(Some("99999")).is_err());
    }
}
