//! Source host port - interface to the source-control collaborator.
//!
//! Only the operations the executor actually performs: listing open change
//! requests and issues, file fetch/commit, branch creation, opening change
//! requests and issues, repository metrics, recent commits. The owning
//! repository is fixed at adapter construction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository-level metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoMetrics {
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,
    pub size_kb: u64,
}

/// Summary of an issue as listed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

/// Summary of a change request (pull request) as listed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequestSummary {
    pub number: u64,
    pub title: String,
}

/// Summary of a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

/// A fetched file: decoded content plus the host's revision marker, needed
/// to update the file in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub content: String,
    pub revision: String,
}

/// Reference to a newly opened issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueRef {
    pub number: u64,
}

/// Reference to a newly opened change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRequestRef {
    pub number: u64,
}

/// Filter for issue listings.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// "open" or "closed"; host default when absent.
    pub state: Option<String>,
    /// Restrict to issues carrying this label.
    pub label: Option<String>,
    /// Page size cap.
    pub per_page: Option<u32>,
}

impl IssueFilter {
    pub fn open() -> Self {
        Self {
            state: Some("open".into()),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// Port for the source-control host.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// List change requests in the given state ("open"/"closed"/"all").
    async fn list_change_requests(
        &self,
        state: &str,
    ) -> Result<Vec<ChangeRequestSummary>, SourceHostError>;

    /// List issues matching the filter.
    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<IssueSummary>, SourceHostError>;

    /// Fetch a file's decoded content and revision marker.
    async fn get_file(&self, path: &str) -> Result<RemoteFile, SourceHostError>;

    /// Create a branch off the default branch.
    async fn create_branch(&self, name: &str) -> Result<(), SourceHostError>;

    /// Create or update a file. Commits to the default branch when `branch`
    /// is absent. `revision` is required when updating an existing file.
    async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        branch: Option<&str>,
        revision: Option<&str>,
    ) -> Result<(), SourceHostError>;

    /// Open a change request from `head` into the default branch.
    async fn open_change_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
    ) -> Result<ChangeRequestRef, SourceHostError>;

    /// Open an issue with the given labels.
    async fn open_issue(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<IssueRef, SourceHostError>;

    /// Fetch repository metrics.
    async fn repo_metrics(&self) -> Result<RepoMetrics, SourceHostError>;

    /// List recent commits on the default branch.
    async fn recent_commits(&self, limit: u32) -> Result<Vec<CommitSummary>, SourceHostError>;
}

/// Source host errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceHostError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl SourceHostError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
