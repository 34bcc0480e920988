//! Token deployer port - interface to the token-deployment collaborator.

use async_trait::async_trait;

/// What to deploy. The fee-recipient policy is fixed inside the adapter,
/// not chosen per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
}

/// On-chain confirmation of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDeployment {
    pub transaction: String,
    pub contract: String,
}

/// Port for the token-deployment service.
#[async_trait]
pub trait TokenDeployer: Send + Sync {
    /// Deploy a token and wait for on-chain confirmation.
    async fn deploy(&self, spec: &TokenSpec) -> Result<TokenDeployment, DeployError>;

    /// Current balance of the deploying wallet in wei, if the backend can
    /// report one. `None` means the precondition cannot be checked and the
    /// balance guardrail passes.
    async fn balance(&self) -> Result<Option<u128>, DeployError> {
        Ok(None)
    }
}

/// Token deployment errors.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("deployment failed: {0}")]
    Failed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl DeployError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
