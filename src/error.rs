//! Error types
//!
//! Startup configuration failures are fatal. Generation failures never leave
//! the responder; they are mapped to a fallback reply there.

use std::time::Duration;
use thiserror::Error;

/// Configuration errors detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN nao configurado! Defina BOT_TOKEN no ambiente ou no arquivo .env")]
    MissingToken,

    #[error("Invalid PERCHANCE_TIMEOUT_SECS value: {0:?}")]
    InvalidTimeout(String),
}

/// Why a call to the text generation API produced no usable reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("API returned an empty body")]
    EmptyBody,
}

impl GenerationError {
    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
