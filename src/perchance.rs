//! Perchance text API client
//!
//! One POST per generated reply. Every failure mode is reported as a
//! [`GenerationError`] value; nothing here panics or retries.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;

/// Source of generated text for a prompt
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// API request body
#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    prompt: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Perchance API client
#[derive(Clone)]
pub struct PerchanceClient {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl PerchanceClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            timeout,
        })
    }

    /// Create from config
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn request(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = TextRequest {
            prompt,
            kind: "chat",
        };

        debug!("Calling Perchance API: prompt_len={}", prompt.len());

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, self.timeout))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyBody);
        }

        debug!("Perchance response: {} chars", text.chars().count());
        Ok(text.to_string())
    }
}

#[async_trait]
impl CompletionBackend for PerchanceClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let result = self.request(prompt).await;
        if let Err(e) = &result {
            warn!("Erro na API Perchance: {}", e);
        }
        result
    }
}
