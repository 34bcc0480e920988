//! Social poster port - interface to the social-posting collaborator.

use async_trait::async_trait;

/// The platform's acknowledgement of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub id: String,
}

/// Port for the social-posting service.
#[async_trait]
pub trait SocialPoster: Send + Sync {
    /// Publish `text` and return the platform's id for it.
    async fn post(&self, text: &str) -> Result<PostReceipt, SocialError>;
}

/// Social posting errors.
#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl SocialError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
