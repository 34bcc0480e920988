//! GitHub REST v3 adapter for the source host port.
//!
//! Scoped to one repository, fixed at construction. The default branch is
//! looked up from the repository record when an operation needs it rather
//! than assumed.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

use crate::config::SourceHostConfig;
use crate::ports::{
    ChangeRequestRef, ChangeRequestSummary, CommitSummary, IssueFilter, IssueRef, IssueSummary,
    RemoteFile, RepoMetrics, SourceHost, SourceHostError,
};

const USER_AGENT: &str = concat!("sentinel-agent/", env!("CARGO_PKG_VERSION"));

pub struct GitHubHost {
    client: reqwest::Client,
    config: SourceHostConfig,
}

impl GitHubHost {
    pub fn new(config: SourceHostConfig) -> Result<Self, SourceHostError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceHostError::network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{suffix}",
            self.config.base_url, self.config.owner, self.config.repo
        )
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.config.token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    async fn check(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, SourceHostError> {
        let response = response.map_err(|e| SourceHostError::network(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceHostError::NotFound(response.url().path().to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceHostError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, SourceHostError> {
        let response = self
            .check(
                self.request(reqwest::Method::GET, url)
                    .query(query)
                    .send()
                    .await,
            )
            .await?;
        response
            .json()
            .await
            .map_err(|e| SourceHostError::parse(e.to_string()))
    }

    async fn default_branch(&self) -> Result<String, SourceHostError> {
        let repo: RepoDto = self.get_json(self.repo_url(""), &[]).await?;
        Ok(repo.default_branch)
    }
}

#[async_trait]
impl SourceHost for GitHubHost {
    async fn list_change_requests(
        &self,
        state: &str,
    ) -> Result<Vec<ChangeRequestSummary>, SourceHostError> {
        let pulls: Vec<PullDto> = self
            .get_json(
                self.repo_url("/pulls"),
                &[("state", state.to_string()), ("per_page", "100".into())],
            )
            .await?;
        Ok(pulls
            .into_iter()
            .map(|p| ChangeRequestSummary {
                number: p.number,
                title: p.title,
            })
            .collect())
    }

    async fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<IssueSummary>, SourceHostError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(state) = &filter.state {
            query.push(("state", state.clone()));
        }
        if let Some(label) = &filter.label {
            query.push(("labels", label.clone()));
        }
        if let Some(per_page) = filter.per_page {
            query.push(("per_page", per_page.to_string()));
        }

        let issues: Vec<IssueDto> = self.get_json(self.repo_url("/issues"), &query).await?;
        // The issues endpoint also lists pull requests; drop them.
        Ok(issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .map(|i| IssueSummary {
                number: i.number,
                title: i.title,
                state: i.state,
                created_at: i.created_at,
            })
            .collect())
    }

    async fn get_file(&self, path: &str) -> Result<RemoteFile, SourceHostError> {
        let dto: ContentDto = self
            .get_json(self.repo_url(&format!("/contents/{path}")), &[])
            .await?;
        Ok(RemoteFile {
            content: decode_content(&dto.content)?,
            revision: dto.sha,
        })
    }

    async fn create_branch(&self, name: &str) -> Result<(), SourceHostError> {
        let default = self.default_branch().await?;
        let head: RefDto = self
            .get_json(self.repo_url(&format!("/git/ref/heads/{default}")), &[])
            .await?;

        debug!(name, base = default, "creating branch");
        self.check(
            self.request(reqwest::Method::POST, self.repo_url("/git/refs"))
                .json(&serde_json::json!({
                    "ref": format!("refs/heads/{name}"),
                    "sha": head.object.sha,
                }))
                .send()
                .await,
        )
        .await?;
        Ok(())
    }

    async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        branch: Option<&str>,
        revision: Option<&str>,
    ) -> Result<(), SourceHostError> {
        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content),
        });
        if let Some(branch) = branch {
            body["branch"] = serde_json::json!(branch);
        }
        if let Some(revision) = revision {
            body["sha"] = serde_json::json!(revision);
        }

        self.check(
            self.request(
                reqwest::Method::PUT,
                self.repo_url(&format!("/contents/{path}")),
            )
            .json(&body)
            .send()
            .await,
        )
        .await?;
        Ok(())
    }

    async fn open_change_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
    ) -> Result<ChangeRequestRef, SourceHostError> {
        let base = self.default_branch().await?;
        let response = self
            .check(
                self.request(reqwest::Method::POST, self.repo_url("/pulls"))
                    .json(&serde_json::json!({
                        "title": title,
                        "body": body,
                        "head": head,
                        "base": base,
                    }))
                    .send()
                    .await,
            )
            .await?;
        let pull: PullDto = response
            .json()
            .await
            .map_err(|e| SourceHostError::parse(e.to_string()))?;
        Ok(ChangeRequestRef {
            number: pull.number,
        })
    }

    async fn open_issue(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<IssueRef, SourceHostError> {
        let response = self
            .check(
                self.request(reqwest::Method::POST, self.repo_url("/issues"))
                    .json(&serde_json::json!({
                        "title": title,
                        "body": body,
                        "labels": labels,
                    }))
                    .send()
                    .await,
            )
            .await?;
        let issue: IssueDto = response
            .json()
            .await
            .map_err(|e| SourceHostError::parse(e.to_string()))?;
        Ok(IssueRef {
            number: issue.number,
        })
    }

    async fn repo_metrics(&self) -> Result<RepoMetrics, SourceHostError> {
        let repo: RepoDto = self.get_json(self.repo_url(""), &[]).await?;
        Ok(RepoMetrics {
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            watchers: repo.subscribers_count.unwrap_or(repo.watchers_count),
            size_kb: repo.size,
        })
    }

    async fn recent_commits(&self, limit: u32) -> Result<Vec<CommitSummary>, SourceHostError> {
        let commits: Vec<CommitDto> = self
            .get_json(
                self.repo_url("/commits"),
                &[("per_page", limit.to_string())],
            )
            .await?;
        Ok(commits
            .into_iter()
            .map(|c| CommitSummary {
                sha: c.sha,
                message: c.commit.message,
                date: c.commit.author.date,
            })
            .collect())
    }
}

/// Content payloads arrive base64 encoded with embedded newlines.
fn decode_content(raw: &str) -> Result<String, SourceHostError> {
    let compact: String = raw.split_whitespace().collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| SourceHostError::parse(format!("content decode: {e}")))?;
    String::from_utf8(bytes).map_err(|e| SourceHostError::parse(format!("content utf8: {e}")))
}

#[derive(Deserialize)]
struct RepoDto {
    default_branch: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    subscribers_count: Option<u64>,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct PullDto {
    number: u64,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct IssueDto {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ContentDto {
    content: String,
    sha: String,
}

#[derive(Deserialize)]
struct RefDto {
    object: RefObjectDto,
}

#[derive(Deserialize)]
struct RefObjectDto {
    sha: String,
}

#[derive(Deserialize)]
struct CommitDto {
    sha: String,
    commit: CommitDetailDto,
}

#[derive(Deserialize)]
struct CommitDetailDto {
    message: String,
    author: CommitAuthorDto,
}

#[derive(Deserialize)]
struct CommitAuthorDto {
    date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_with_embedded_newlines() {
        let encoded = "Zm4gbWFpbigpIHt9\nCg==";
        assert_eq!(decode_content(encoded).unwrap(), "fn main() {}\n");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode_content("!!not base64!!"),
            Err(SourceHostError::Parse(_))
        ));
    }

    #[test]
    fn repo_url_includes_owner_and_repo() {
        let host = GitHubHost::new(
            SourceHostConfig::new("t", "octocat", "hello").with_base_url("http://localhost:1"),
        )
        .unwrap();
        assert_eq!(
            host.repo_url("/pulls"),
            "http://localhost:1/repos/octocat/hello/pulls"
        );
        assert_eq!(host.repo_url(""), "http://localhost:1/repos/octocat/hello");
    }

    #[test]
    fn issue_listing_drops_pull_requests() {
        let raw = r#"[
            {"number": 1, "title": "real issue", "state": "open",
             "created_at": "2026-01-01T00:00:00Z"},
            {"number": 2, "title": "a pull", "state": "open",
             "created_at": "2026-01-01T00:00:00Z", "pull_request": {"url": "x"}}
        ]"#;
        let issues: Vec<IssueDto> = serde_json::from_str(raw).unwrap();
        let kept: Vec<_> = issues.iter().filter(|i| i.pull_request.is_none()).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].number, 1);
    }
}
