//! Oracle port - interface to the language-model collaborator.
//!
//! The engine sees a single logical request-response: an ordered message
//! sequence in, assistant text out. Transport-level retries are exhausted
//! inside the adapter; a surfaced error is final for this cycle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the oracle conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Port for the language-model oracle.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send a chat completion request and return the assistant's text.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, OracleError>;
}

/// Oracle call errors.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl OracleError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if a retry inside the transport layer could help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OracleError::RateLimited { .. }
                | OracleError::Unavailable { .. }
                | OracleError::Network(_)
                | OracleError::Timeout { .. }
        )
    }
}
