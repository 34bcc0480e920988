//! In-memory collaborator fakes for tests.
//!
//! Public so integration tests can drive whole cycles without network
//! access. Every mock records the calls it receives; scripted replies are
//! consumed in FIFO order.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{
    ChangeRequestRef, ChangeRequestSummary, ChatMessage, CommitSummary, DeployError, IssueFilter,
    IssueRef, IssueSummary, Oracle, OracleError, PostReceipt, RemoteFile, RepoMetrics,
    SocialError, SocialPoster, SourceHost, SourceHostError, TokenDeployer, TokenDeployment,
    TokenSpec,
};

/// Oracle fake with a scripted reply queue.
#[derive(Default)]
pub struct MockOracle {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_text(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    /// Queue a network failure.
    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every message sequence received so far.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, OracleError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(OracleError::network(message)),
            None => Err(OracleError::unavailable("no scripted reply")),
        }
    }
}

/// A recorded `put_file` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePut {
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: Option<String>,
}

/// Source host fake backed by in-memory tables.
#[derive(Default)]
pub struct MockSourceHost {
    pub open_change_requests: Mutex<Vec<ChangeRequestSummary>>,
    pub open_issues: Mutex<Vec<IssueSummary>>,
    pub files: Mutex<HashMap<String, String>>,
    pub metrics: Mutex<RepoMetrics>,
    pub commits: Mutex<Vec<CommitSummary>>,
    pub branches: Mutex<Vec<String>>,
    pub puts: Mutex<Vec<FilePut>>,
    pub opened_issues: Mutex<Vec<(String, String, Vec<String>)>>,
    pub opened_change_requests: Mutex<Vec<(String, String, String)>>,
}

impl MockSourceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn add_open_issue(&self, number: u64, title: &str) {
        self.open_issues.lock().unwrap().push(IssueSummary {
            number,
            title: title.to_string(),
            state: "open".to_string(),
            created_at: chrono::Utc::now(),
        });
    }

    pub fn add_open_change_request(&self, number: u64, title: &str) {
        self.open_change_requests
            .lock()
            .unwrap()
            .push(ChangeRequestSummary {
                number,
                title: title.to_string(),
            });
    }

    pub fn add_commit(&self, sha: &str, message: &str) {
        self.commits.lock().unwrap().push(CommitSummary {
            sha: sha.to_string(),
            message: message.to_string(),
            date: chrono::Utc::now(),
        });
    }

    pub fn set_metrics(&self, metrics: RepoMetrics) {
        *self.metrics.lock().unwrap() = metrics;
    }
}

#[async_trait]
impl SourceHost for MockSourceHost {
    async fn list_change_requests(
        &self,
        _state: &str,
    ) -> Result<Vec<ChangeRequestSummary>, SourceHostError> {
        Ok(self.open_change_requests.lock().unwrap().clone())
    }

    async fn list_issues(
        &self,
        _filter: &IssueFilter,
    ) -> Result<Vec<IssueSummary>, SourceHostError> {
        Ok(self.open_issues.lock().unwrap().clone())
    }

    async fn get_file(&self, path: &str) -> Result<RemoteFile, SourceHostError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|content| RemoteFile {
                content: content.clone(),
                revision: format!("rev-{path}"),
            })
            .ok_or_else(|| SourceHostError::NotFound(path.to_string()))
    }

    async fn create_branch(&self, name: &str) -> Result<(), SourceHostError> {
        self.branches.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        branch: Option<&str>,
        _revision: Option<&str>,
    ) -> Result<(), SourceHostError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self.puts.lock().unwrap().push(FilePut {
            path: path.to_string(),
            content: content.to_string(),
            message: message.to_string(),
            branch: branch.map(String::from),
        });
        Ok(())
    }

    async fn open_change_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
    ) -> Result<ChangeRequestRef, SourceHostError> {
        let mut opened = self.opened_change_requests.lock().unwrap();
        opened.push((title.to_string(), body.to_string(), head.to_string()));
        Ok(ChangeRequestRef {
            number: 100 + opened.len() as u64,
        })
    }

    async fn open_issue(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<IssueRef, SourceHostError> {
        let mut opened = self.opened_issues.lock().unwrap();
        opened.push((title.to_string(), body.to_string(), labels.to_vec()));
        Ok(IssueRef {
            number: 200 + opened.len() as u64,
        })
    }

    async fn repo_metrics(&self) -> Result<RepoMetrics, SourceHostError> {
        Ok(self.metrics.lock().unwrap().clone())
    }

    async fn recent_commits(&self, limit: u32) -> Result<Vec<CommitSummary>, SourceHostError> {
        let commits = self.commits.lock().unwrap();
        Ok(commits.iter().take(limit as usize).cloned().collect())
    }
}

/// Social poster fake.
#[derive(Default)]
pub struct MockPoster {
    pub posts: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl MockPoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent post fail with a network error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl SocialPoster for MockPoster {
    async fn post(&self, text: &str) -> Result<PostReceipt, SocialError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(SocialError::network(message));
        }
        let mut posts = self.posts.lock().unwrap();
        posts.push(text.to_string());
        Ok(PostReceipt {
            id: format!("post-{}", posts.len()),
        })
    }
}

/// Token deployer fake.
#[derive(Default)]
pub struct MockDeployer {
    pub wallet_balance: Mutex<Option<u128>>,
    pub deployments: Mutex<Vec<TokenSpec>>,
}

impl MockDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, balance: u128) {
        *self.wallet_balance.lock().unwrap() = Some(balance);
    }
}

#[async_trait]
impl TokenDeployer for MockDeployer {
    async fn deploy(&self, spec: &TokenSpec) -> Result<TokenDeployment, DeployError> {
        self.deployments.lock().unwrap().push(spec.clone());
        Ok(TokenDeployment {
            transaction: "0xfeed".to_string(),
            contract: "0xc0ffee".to_string(),
        })
    }

    async fn balance(&self) -> Result<Option<u128>, DeployError> {
        Ok(*self.wallet_balance.lock().unwrap())
    }
}
