//! Configuration management

use std::time::Duration;

use crate::error::ConfigError;

/// Default Perchance text endpoint
pub const DEFAULT_API_URL: &str = "https://api.perchance.org/ai/text";

/// Default timeout for one generation request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bot configuration
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token (required)
    pub bot_token: String,

    /// Text generation endpoint
    pub api_url: String,

    /// Hard timeout for each generation request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = ["BOT_TOKEN", "TELOXIDE_TOKEN"]
            .iter()
            .filter_map(|key| lookup(key))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let api_url = lookup("PERCHANCE_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout = match lookup("PERCHANCE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                if secs == 0 {
                    return Err(ConfigError::InvalidTimeout(raw));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            bot_token,
            api_url,
            request_timeout,
        })
    }
}
