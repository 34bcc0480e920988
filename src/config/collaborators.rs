//! Collaborator credential configuration.
//!
//! The source-control host is required. The social poster and the token
//! deployer are optional: each is enabled only when its full credential set
//! is present, and otherwise silently disabled so the corresponding actions
//! degrade to a skip result.

use secrecy::Secret;

/// Source-control host credentials and target repository.
#[derive(Debug, Clone)]
pub struct SourceHostConfig {
    pub token: Secret<String>,
    pub owner: String,
    pub repo: String,
    /// Base URL of the REST API.
    pub base_url: String,
}

impl SourceHostConfig {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            token: Secret::new(token.into()),
            owner: owner.into(),
            repo: repo.into(),
            base_url: "https://api.github.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// OAuth1 credential quad for the social-posting service.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    pub consumer_key: String,
    pub consumer_secret: Secret<String>,
    pub access_token: String,
    pub access_token_secret: Secret<String>,
}

/// Token-deployment service credentials.
#[derive(Debug, Clone)]
pub struct TokenDeployConfig {
    pub api_key: Secret<String>,
    /// Wallet that receives the fixed fee-recipient policy.
    pub reward_address: String,
    pub base_url: String,
}

impl TokenDeployConfig {
    pub fn new(api_key: impl Into<String>, reward_address: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            reward_address: reward_address.into(),
            base_url: "https://api.bankr.bot".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}
