mod client;
pub(crate) mod types;

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::{ChatCompletion, Completion, Message};
use crate::util::normalize_base_url;
use client::OpenAiClient;

/// Fixed per-request timeout; there is no retry on expiry.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// =============================================================================
// OpenAI-compatible Agent
// =============================================================================

/// Chat completion agent for any server speaking the OpenAI
/// `/v1/chat/completions` dialect.
#[derive(Clone)]
pub struct OpenAiCompat {
    base_url: String,
    pub(crate) model: String,
    api_key: Option<String>,
}

impl OpenAiCompat {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            model: model.into(),
            api_key: None,
        }
    }

    /// Bearer key sent with every request. Local servers usually ignore it.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, client::CHAT_COMPLETIONS_PATH)
    }

    pub(crate) fn client(&self) -> Result<OpenAiClient> {
        OpenAiClient::new(&self.base_url, self.api_key.as_deref(), REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompat {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<Completion> {
        let request = types::ChatRequest::new(&self.model)
            .temperature(temperature)
            .message(Message::system(system))
            .message(Message::user(user));

        let started = Instant::now();
        let response = self.client()?.chat(&request).await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let content = response
            .first_content()
            .ok_or_else(|| anyhow!("No content in chat completion response"))?;

        Ok(Completion {
            content,
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_base_url() {
        let ai = OpenAiCompat::new("http://127.0.0.1:1234/", "ibm/granite-4-h-tiny");
        assert_eq!(ai.base_url(), "http://127.0.0.1:1234");
        assert_eq!(ai.model(), "ibm/granite-4-h-tiny");
        assert_eq!(ai.endpoint(), "http://127.0.0.1:1234/v1/chat/completions");
    }

    #[test]
    fn test_no_api_key_by_default() {
        let ai = OpenAiCompat::new("http://127.0.0.1:1234", "m");
        assert!(!ai.has_api_key());
    }

    #[test]
    fn test_with_api_key() {
        let ai = OpenAiCompat::new("http://127.0.0.1:1234", "m").with_api_key("sk-test");
        assert!(ai.has_api_key());
    }
}
