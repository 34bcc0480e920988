//! Ports - interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! engine and the outside world. Adapters implement these ports. Retry and
//! backoff belong to the adapters; the engine sees one logical call.

mod oracle;
mod social;
mod source_host;
mod token_deployer;

pub use oracle::{ChatMessage, MessageRole, Oracle, OracleError};
pub use social::{PostReceipt, SocialError, SocialPoster};
pub use source_host::{
    ChangeRequestRef, ChangeRequestSummary, CommitSummary, IssueFilter, IssueRef, IssueSummary,
    RemoteFile, RepoMetrics, SourceHost, SourceHostError,
};
pub use token_deployer::{DeployError, TokenDeployer, TokenDeployment, TokenSpec};
