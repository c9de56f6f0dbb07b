use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Message Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Completion
// =============================================================================

/// Text returned by a chat completion together with the wall-clock time the
/// round trip took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub latency_ms: u64,
}

// =============================================================================
// ChatCompletion Trait
// =============================================================================

/// A single-shot chat completion: one system message, one user message.
///
/// Implementations must not retry; a failed request is returned as an error.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<Completion>;
}

#[async_trait]
impl<T: ChatCompletion + ?Sized> ChatCompletion for std::sync::Arc<T> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<Completion> {
        (**self).complete(system, user, temperature).await
    }
}
