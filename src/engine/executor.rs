//! Action executor.
//!
//! Performs the side effects for one validated decision, guardrails first.
//! A guardrail rejection or a missing collaborator comes back as an
//! [`ExecutionOutcome`] value and the cycle proceeds normally; only
//! unexpected collaborator failures travel as [`ExecuteError`].
//!
//! Guardrail ordering is fixed: every check that can reject runs before the
//! first side effect, so a rejected action leaves no partial state behind.

use chrono::Utc;
use tracing::{debug, info};

use crate::config::ActionPolicy;
use crate::domain::{
    Action, CommitDigest, CreateIssueParams, Decision, ExecutionOutcome, IssueDigest,
    JournalParams, LaunchTokenParams, MonitorFocus, MonitorParams, RepoStats, SelfImproveParams,
    TweetParams,
};
use crate::engine::decision::strip_code_fences;
use crate::engine::StateStore;
use crate::ports::{
    ChatMessage, DeployError, IssueFilter, Oracle, OracleError, SocialError, SocialPoster,
    SourceHost, SourceHostError, TokenDeployer, TokenSpec,
};

/// Collaborator failure during execution. Guardrail rejections are never
/// errors; see [`ExecutionOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    #[error("source host: {0}")]
    SourceHost(#[from] SourceHostError),

    #[error("social: {0}")]
    Social(#[from] SocialError),

    #[error("token deploy: {0}")]
    Deploy(#[from] DeployError),
}

pub struct ActionExecutor<'a> {
    host: &'a dyn SourceHost,
    oracle: &'a dyn Oracle,
    social: Option<&'a dyn SocialPoster>,
    deployer: Option<&'a dyn TokenDeployer>,
    policy: &'a ActionPolicy,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(
        host: &'a dyn SourceHost,
        oracle: &'a dyn Oracle,
        social: Option<&'a dyn SocialPoster>,
        deployer: Option<&'a dyn TokenDeployer>,
        policy: &'a ActionPolicy,
    ) -> Self {
        Self {
            host,
            oracle,
            social,
            deployer,
            policy,
        }
    }

    /// Execute one decision against the collaborators.
    pub async fn execute(
        &self,
        store: &mut StateStore,
        decision: &Decision,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        debug!(action = %decision.kind(), "executing");
        match &decision.action {
            Action::SelfImprove(p) => self.self_improve(store, p).await,
            Action::CreateIssue(p) => self.create_issue(p).await,
            Action::Journal(p) => self.journal(store, p, &decision.reasoning).await,
            Action::Monitor(p) => self.monitor(store, p).await,
            Action::Tweet(p) => self.tweet(p).await,
            Action::LaunchToken(p) => self.launch_token(p).await,
        }
    }

    async fn self_improve(
        &self,
        store: &mut StateStore,
        params: &SelfImproveParams,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let policy = &self.policy.self_improve;
        let target = params.target_file.trim();

        if target.is_empty() {
            return Ok(ExecutionOutcome::Rejected(
                "self-improve rejected: no target file specified".into(),
            ));
        }
        if policy.forbidden_files.iter().any(|f| f == target) {
            return Ok(ExecutionOutcome::Rejected(format!(
                "self-improve rejected: {target} is forbidden"
            )));
        }
        if !policy.allowed_files.iter().any(|f| f == target) {
            return Ok(ExecutionOutcome::Rejected(format!(
                "self-improve rejected: {target} is not on the allow list"
            )));
        }

        let open = self.host.list_change_requests("open").await?;
        let mine = open
            .iter()
            .filter(|cr| cr.title.starts_with(&policy.title_prefix))
            .count();
        if mine >= policy.max_open_requests {
            return Ok(ExecutionOutcome::Rejected(format!(
                "self-improve rejected: {mine} open change requests at the limit of {}",
                policy.max_open_requests
            )));
        }

        let file = self.host.get_file(target).await?;
        let goal_hint = params
            .improvement_description
            .as_deref()
            .unwrap_or("general clarity and robustness");

        let messages = vec![
            ChatMessage::system(
                "You rewrite source files. Return the complete improved file content \
                 and nothing else. No commentary, no code fences.",
            ),
            ChatMessage::user(format!(
                "Improve this file. Focus: {goal_hint}\n\nFile: {target}\n\n{}",
                file.content
            )),
        ];
        let improved = strip_code_fences(&self.oracle.chat(&messages).await?).to_string();

        if improved.trim().is_empty() || improved.trim() == file.content.trim() {
            return Ok(ExecutionOutcome::Rejected(format!(
                "self-improve rejected: rewrite of {target} is identical to the current content"
            )));
        }

        let branch = format!(
            "{}-{}-{}",
            policy.branch_prefix,
            Utc::now().format("%Y%m%d%H%M%S"),
            slugify(target)
        );
        self.host.create_branch(&branch).await?;
        self.host
            .put_file(
                target,
                &improved,
                &format!("Improve {target}"),
                Some(&branch),
                Some(&file.revision),
            )
            .await?;

        let title = format!("{} Improve {target}", policy.title_prefix);
        let body = format!("Autonomous improvement of `{target}`.\n\nFocus: {goal_hint}");
        let cr = self.host.open_change_request(&title, &body, &branch).await?;
        info!(number = cr.number, target, "opened change request");

        if let Some(goal) = &policy.tracked_goal {
            store.update_goal(
                goal,
                Some(&format!("Opened change request #{} for {target}", cr.number)),
                None,
            );
        }

        Ok(ExecutionOutcome::Completed(format!(
            "opened change request #{} improving {target}",
            cr.number
        )))
    }

    async fn create_issue(
        &self,
        params: &CreateIssueParams,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let policy = &self.policy.create_issue;

        let Some(title) = params
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return Ok(ExecutionOutcome::Rejected(
                "issue rejected: no title provided".into(),
            ));
        };

        let filter = IssueFilter::open()
            .with_label(&policy.label)
            .with_per_page(100);
        let open = self.host.list_issues(&filter).await?;
        if open.len() >= policy.max_open_issues {
            return Ok(ExecutionOutcome::Rejected(format!(
                "issue rejected: {} open tracked issues at the limit of {}",
                open.len(),
                policy.max_open_issues
            )));
        }

        let duplicate = open.iter().find(|i| i.title.eq_ignore_ascii_case(title));
        if let Some(existing) = duplicate {
            return Ok(ExecutionOutcome::Rejected(format!(
                "issue rejected: duplicate of open issue #{}",
                existing.number
            )));
        }

        let body = params.body.as_deref().unwrap_or_default();
        let issue = self
            .host
            .open_issue(title, body, &[policy.label.clone()])
            .await?;
        info!(number = issue.number, "opened issue");

        Ok(ExecutionOutcome::Completed(format!(
            "opened issue #{}: {title}",
            issue.number
        )))
    }

    async fn journal(
        &self,
        store: &mut StateStore,
        params: &JournalParams,
        reasoning: &str,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let policy = &self.policy.journal;
        let cycle = store.cycle_count();
        let now = Utc::now();

        let title = params
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Cycle {cycle}"));
        let tags = params.tags.clone().unwrap_or_default();

        let mut prompt = format!(
            "Write a journal entry titled \"{title}\". Style: {}. \
             Return the entry body as plain markdown prose, nothing else.",
            policy.style
        );
        // The decision's reasoning stands in for a missing draft.
        let seed = params
            .draft
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(reasoning);
        if !seed.trim().is_empty() {
            prompt.push_str(&format!("\n\nExpand on this seed:\n{seed}"));
        }
        let messages = vec![
            ChatMessage::system("You keep a concise operational journal."),
            ChatMessage::user(prompt),
        ];
        let prose = self.oracle.chat(&messages).await?;

        let mut entry = String::from("---\n");
        entry.push_str(&format!("title: \"{title}\"\n"));
        entry.push_str(&format!("date: {}\n", now.to_rfc3339()));
        entry.push_str(&format!("cycle: {cycle}\n"));
        if !tags.is_empty() {
            entry.push_str(&format!("tags: [{}]\n", tags.join(", ")));
        }
        entry.push_str("---\n\n");
        entry.push_str(&format!("# {title}\n\n"));
        entry.push_str(prose.trim());
        entry.push('\n');

        let mut slug = slugify(&title);
        if slug.is_empty() {
            slug = format!("cycle-{cycle}");
        }
        let path = format!("{}/{}-{slug}.md", policy.directory, now.format("%Y-%m-%d"));
        // [skip ci] keeps journal commits from triggering the repository's
        // own pipelines.
        self.host
            .put_file(&path, &entry, &format!("journal: {title} [skip ci]"), None, None)
            .await?;
        info!(path = %path, "committed journal entry");

        if let Some(goal) = &policy.tracked_goal {
            store.update_goal(goal, Some(&format!("Committed journal entry {path}")), None);
        }

        Ok(ExecutionOutcome::Completed(format!(
            "committed journal entry {path}"
        )))
    }

    async fn monitor(
        &self,
        store: &mut StateStore,
        params: &MonitorParams,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let policy = &self.policy.monitor;

        if !store.can_monitor(policy.min_interval_minutes) {
            return Ok(ExecutionOutcome::Skipped(format!(
                "monitor skipped: within the {}-minute cooldown",
                policy.min_interval_minutes
            )));
        }

        let metrics = self.host.repo_metrics().await?;
        let star_delta = store
            .repo_stats()
            .map(|prev| metrics.stars as i64 - prev.stars as i64)
            .unwrap_or(0);

        // A general pass refreshes both digest pages; the narrowed focuses
        // fetch only their own. Unrecognized focuses stay headline-only.
        let mut recent_issues = Vec::new();
        let mut recent_commits = Vec::new();
        if matches!(params.focus, MonitorFocus::General | MonitorFocus::Issues) {
            let issues = self
                .host
                .list_issues(&IssueFilter::open().with_per_page(5))
                .await?;
            recent_issues = issues
                .into_iter()
                .map(|i| IssueDigest {
                    number: i.number,
                    title: i.title,
                    state: i.state,
                    created_at: i.created_at,
                })
                .collect();
        }
        if matches!(params.focus, MonitorFocus::General | MonitorFocus::Commits) {
            let commits = self.host.recent_commits(5).await?;
            recent_commits = commits
                .into_iter()
                .map(|c| CommitDigest {
                    sha: c.sha,
                    message: c.message,
                    date: c.date,
                })
                .collect();
        }

        let summary = format!(
            "monitored: {} stars ({star_delta:+}), {} forks, {} open issues",
            metrics.stars, metrics.forks, metrics.open_issues
        );
        store.update_repo_stats(RepoStats {
            stars: metrics.stars,
            forks: metrics.forks,
            open_issues: metrics.open_issues,
            watchers: metrics.watchers,
            size_kb: metrics.size_kb,
            recent_issues,
            recent_commits,
            fetched_at: Utc::now(),
        });

        if let Some(goal) = &policy.tracked_goal {
            store.update_goal(goal, Some(&summary), None);
        }

        Ok(ExecutionOutcome::Completed(summary))
    }

    async fn tweet(&self, params: &TweetParams) -> Result<ExecutionOutcome, ExecuteError> {
        let Some(social) = self.social else {
            return Ok(ExecutionOutcome::Skipped(
                "tweet skipped: social posting not configured".into(),
            ));
        };

        // The decision's draft is a topic seed, not finished copy; the
        // oracle always writes the post itself.
        let topic = match params.seed() {
            Some(seed) => format!("Write one post about: {seed}"),
            None => "Write one post about your current work.".to_string(),
        };
        let mood = params.mood.as_deref().unwrap_or("neutral");
        let messages = vec![
            ChatMessage::system(
                "You write short public posts in the first person. Return the post \
                 text only: no quotes, no hashtag spam, no commentary.",
            ),
            ChatMessage::user(format!(
                "{topic} Mood: {mood}. Hard limit {} characters.",
                self.policy.post.max_length
            )),
        ];
        let raw = self.oracle.chat(&messages).await?;

        let text = truncate_post(&raw, self.policy.post.max_length);
        if text.is_empty() {
            return Ok(ExecutionOutcome::Skipped(
                "tweet skipped: empty post text after cleanup".into(),
            ));
        }

        let receipt = social.post(&text).await?;
        info!(id = %receipt.id, chars = text.chars().count(), "posted");

        Ok(ExecutionOutcome::Completed(format!(
            "posted {} chars, id {}",
            text.chars().count(),
            receipt.id
        )))
    }

    async fn launch_token(
        &self,
        params: &LaunchTokenParams,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let Some(deployer) = self.deployer else {
            return Ok(ExecutionOutcome::Skipped(
                "token launch skipped: deployment not configured".into(),
            ));
        };

        if let Some(min) = self.policy.launch_token.min_balance_wei {
            if let Some(balance) = deployer.balance().await? {
                if balance < min {
                    return Ok(ExecutionOutcome::Rejected(format!(
                        "token launch rejected: balance {balance} wei below minimum {min}"
                    )));
                }
            }
        }

        let spec = match (
            params.name.as_deref().filter(|n| !n.trim().is_empty()),
            params.symbol.as_deref().filter(|s| !s.trim().is_empty()),
        ) {
            (Some(name), Some(symbol)) => TokenSpec {
                name: name.trim().to_string(),
                symbol: symbol.trim().to_uppercase(),
                description: params.description.clone(),
            },
            _ => match self.compose_token_spec().await? {
                Some(spec) => spec,
                None => {
                    return Ok(ExecutionOutcome::Rejected(
                        "token launch rejected: could not compose a token spec".into(),
                    ))
                }
            },
        };

        let deployment = deployer.deploy(&spec).await?;
        info!(
            symbol = %spec.symbol,
            contract = %deployment.contract,
            "deployed token"
        );

        Ok(ExecutionOutcome::Completed(format!(
            "deployed token {} at {}, tx {}",
            spec.symbol, deployment.contract, deployment.transaction
        )))
    }

    async fn compose_token_spec(&self) -> Result<Option<TokenSpec>, ExecuteError> {
        let messages = vec![
            ChatMessage::system(
                "You name tokens. Respond with valid JSON only: \
                 {\"name\": \"...\", \"symbol\": \"...\", \"description\": \"...\"}. \
                 Symbol is 3-6 uppercase letters.",
            ),
            ChatMessage::user("Invent a token that reflects your current trajectory.".to_string()),
        ];
        let reply = self.oracle.chat(&messages).await?;
        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(strip_code_fences(&reply))
        else {
            return Ok(None);
        };
        let name = parsed.get("name").and_then(|v| v.as_str());
        let symbol = parsed.get("symbol").and_then(|v| v.as_str());
        let (Some(name), Some(symbol)) = (name, symbol) else {
            return Ok(None);
        };
        if name.trim().is_empty() || symbol.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(TokenSpec {
            name: name.trim().to_string(),
            symbol: symbol.trim().to_uppercase(),
            description: parsed
                .get("description")
                .and_then(|v| v.as_str())
                .map(String::from),
        }))
    }
}

/// Normalize post text: strip wrapping quotes, then truncate on a character
/// boundary so an over-long result comes back at exactly `max_length` chars
/// ending with "...".
pub fn truncate_post(text: &str, max_length: usize) -> String {
    let trimmed = text.trim().trim_matches('"').trim();
    if trimmed.chars().count() <= max_length {
        return trimmed.to_string();
    }
    let keep = max_length.saturating_sub(3);
    let mut cut: String = trimmed.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// Lowercased, hyphen-separated rendering of a title for file paths.
fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockDeployer, MockOracle, MockPoster, MockSourceHost};
    use crate::ports::RepoMetrics;
    use tempfile::TempDir;

    struct Rig {
        host: MockSourceHost,
        oracle: MockOracle,
        poster: MockPoster,
        deployer: MockDeployer,
        policy: ActionPolicy,
    }

    impl Rig {
        fn new() -> Self {
            let mut policy = ActionPolicy::default();
            policy.self_improve.allowed_files.push("src/core.rs".into());
            policy
                .self_improve
                .forbidden_files
                .push("src/secrets.rs".into());
            Self {
                host: MockSourceHost::new(),
                oracle: MockOracle::new(),
                poster: MockPoster::new(),
                deployer: MockDeployer::new(),
                policy,
            }
        }

        fn executor(&self) -> ActionExecutor<'_> {
            ActionExecutor::new(
                &self.host,
                &self.oracle,
                Some(&self.poster),
                Some(&self.deployer),
                &self.policy,
            )
        }

        fn bare_executor(&self) -> ActionExecutor<'_> {
            ActionExecutor::new(&self.host, &self.oracle, None, None, &self.policy)
        }
    }

    async fn store(dir: &TempDir) -> StateStore {
        StateStore::load(dir.path().join("state.json"), 288, &[])
            .await
            .unwrap()
    }

    fn decision(action: Action) -> Decision {
        Decision {
            action,
            reasoning: "test".into(),
        }
    }

    #[tokio::test]
    async fn self_improve_rejects_file_outside_allow_list() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::SelfImprove(SelfImproveParams {
                    target_file: "src/other.rs".into(),
                    improvement_description: None,
                })),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ExecutionOutcome::Rejected(_)));
        assert!(outcome.message().contains("not on the allow list"));
        assert!(rig.host.branches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn self_improve_forbidden_wins_over_allowed() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let mut rig = Rig::new();
        // Listed in both: forbidden takes precedence.
        rig.policy
            .self_improve
            .allowed_files
            .push("src/secrets.rs".into());

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::SelfImprove(SelfImproveParams {
                    target_file: "src/secrets.rs".into(),
                    improvement_description: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.message().contains("forbidden"));
    }

    #[tokio::test]
    async fn self_improve_rejects_at_open_request_quota() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_open_change_request(1, "[agent] Improve src/a.rs");
        rig.host.add_open_change_request(2, "[agent] Improve src/b.rs");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::SelfImprove(SelfImproveParams {
                    target_file: "src/core.rs".into(),
                    improvement_description: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.message().contains("at the limit of 2"));
    }

    #[tokio::test]
    async fn self_improve_quota_ignores_unrelated_requests() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_open_change_request(1, "Human-authored refactor");
        rig.host.add_open_change_request(2, "Another human change");
        rig.host.add_file("src/core.rs", "fn main() {}\n");
        rig.oracle.push_text("fn main() { improved(); }\n");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::SelfImprove(SelfImproveParams {
                    target_file: "src/core.rs".into(),
                    improvement_description: Some("clarity".into()),
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn self_improve_happy_path_opens_change_request() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_file("src/core.rs", "fn main() {}\n");
        rig.oracle
            .push_text("```rust\nfn main() { improved(); }\n```");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::SelfImprove(SelfImproveParams {
                    target_file: "src/core.rs".into(),
                    improvement_description: Some("clarity".into()),
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(rig.host.branches.lock().unwrap().len(), 1);
        let puts = rig.host.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].content.contains("improved()"));
        let branch = puts[0].branch.as_deref().unwrap();
        assert!(branch.starts_with("agent/improve-"));
        assert!(branch.ends_with("-src-core-rs"));
        let opened = rig.host.opened_change_requests.lock().unwrap();
        assert!(opened[0].0.starts_with("[agent]"));
    }

    #[tokio::test]
    async fn self_improve_identical_rewrite_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_file("src/core.rs", "fn main() {}\n");
        rig.oracle.push_text("fn main() {}\n");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::SelfImprove(SelfImproveParams {
                    target_file: "src/core.rs".into(),
                    improvement_description: None,
                })),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ExecutionOutcome::Rejected(_)));
        assert!(outcome.message().contains("identical"));
        assert!(rig.host.branches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_issue_rejects_at_quota() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        for n in 1..=5 {
            rig.host.add_open_issue(n, &format!("issue {n}"));
        }

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::CreateIssue(CreateIssueParams {
                    title: Some("New idea".into()),
                    body: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.message().contains("at the limit of 5"));
        assert!(rig.host.opened_issues.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_issue_rejects_case_insensitive_duplicate() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_open_issue(7, "Improve Error Messages");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::CreateIssue(CreateIssueParams {
                    title: Some("improve error messages".into()),
                    body: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.message().contains("duplicate of open issue #7"));
    }

    #[tokio::test]
    async fn create_issue_opens_with_the_configured_label() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::CreateIssue(CreateIssueParams {
                    title: Some("Add retry metrics".into()),
                    body: Some("Track retries.".into()),
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let opened = rig.host.opened_issues.lock().unwrap();
        assert_eq!(opened[0].0, "Add retry metrics");
        assert_eq!(opened[0].2, vec!["autonomous".to_string()]);
    }

    #[tokio::test]
    async fn create_issue_without_title_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::CreateIssue(CreateIssueParams::default())),
            )
            .await
            .unwrap();

        assert!(outcome.message().contains("no title provided"));
        assert!(rig.host.opened_issues.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn journal_commits_frontmatter_entry_with_skip_ci() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        s.start_cycle();
        let rig = Rig::new();
        rig.oracle.push_text("Today I reviewed my own loops.");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::Journal(JournalParams {
                    title: Some("Loop Review".into()),
                    tags: Some(vec!["reflection".into()]),
                    draft: Some("loops".into()),
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let puts = rig.host.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].path.starts_with("journal/"));
        assert!(puts[0].path.ends_with("-loop-review.md"));
        assert!(puts[0].content.starts_with("---\n"));
        assert!(puts[0].content.contains("title: \"Loop Review\""));
        assert!(puts[0].content.contains("cycle: 1"));
        assert!(puts[0].content.contains("tags: [reflection]"));
        assert!(puts[0].content.contains("# Loop Review"));
        assert!(puts[0].content.contains("reviewed my own loops"));
        assert!(puts[0].message.contains("[skip ci]"));
        assert!(puts[0].branch.is_none());
    }

    #[tokio::test]
    async fn journal_without_draft_seeds_from_reasoning() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        s.start_cycle();
        let rig = Rig::new();
        rig.oracle.push_text("The log went quiet and I noticed.");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &Decision {
                    action: Action::Journal(JournalParams {
                        title: Some("Quiet Stretch".into()),
                        tags: None,
                        draft: None,
                    }),
                    reasoning: "three cycles with nothing worth saying".into(),
                },
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let calls = rig.oracle.calls();
        assert!(calls[0][1]
            .content
            .contains("three cycles with nothing worth saying"));
        let puts = rig.host.puts.lock().unwrap();
        assert!(puts[0].content.contains("# Quiet Stretch"));
    }

    #[tokio::test]
    async fn monitor_skips_within_cooldown_without_fetching() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.set_metrics(RepoMetrics {
            stars: 10,
            ..RepoMetrics::default()
        });

        // First pass fetches and stamps the cooldown.
        let first = rig
            .executor()
            .execute(&mut s, &decision(Action::Monitor(MonitorParams::default())))
            .await
            .unwrap();
        assert!(first.is_completed());
        let stamped = s.state().last_monitor;

        let second = rig
            .executor()
            .execute(&mut s, &decision(Action::Monitor(MonitorParams::default())))
            .await
            .unwrap();
        assert!(matches!(second, ExecutionOutcome::Skipped(_)));
        assert_eq!(s.state().last_monitor, stamped);
        assert_eq!(s.repo_stats().unwrap().stars, 10);
    }

    #[tokio::test]
    async fn monitor_reports_star_delta_against_cache() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        s.update_repo_stats(RepoStats {
            stars: 5,
            forks: 0,
            open_issues: 0,
            watchers: 0,
            size_kb: 0,
            recent_issues: vec![],
            recent_commits: vec![],
            fetched_at: Utc::now(),
        });
        let mut rig = Rig::new();
        // The cache update stamped the cooldown; a zero interval clears it.
        rig.policy.monitor.min_interval_minutes = 0;
        rig.host.set_metrics(RepoMetrics {
            stars: 9,
            forks: 2,
            open_issues: 1,
            watchers: 9,
            size_kb: 100,
        });

        let outcome = rig
            .executor()
            .execute(&mut s, &decision(Action::Monitor(MonitorParams::default())))
            .await
            .unwrap();

        assert!(outcome.message().contains("(+4)"));
        assert_eq!(s.repo_stats().unwrap().stars, 9);
    }

    #[tokio::test]
    async fn monitor_general_focus_caches_both_digests() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_open_issue(3, "flaky test");
        rig.host.add_commit("abc123", "fix the watcher");

        let outcome = rig
            .executor()
            .execute(&mut s, &decision(Action::Monitor(MonitorParams::default())))
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let stats = s.repo_stats().unwrap();
        assert_eq!(stats.recent_issues.len(), 1);
        assert_eq!(stats.recent_issues[0].title, "flaky test");
        assert_eq!(stats.recent_commits.len(), 1);
        assert_eq!(stats.recent_commits[0].message, "fix the watcher");
    }

    #[tokio::test]
    async fn monitor_issue_focus_narrows_to_issues() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.host.add_open_issue(3, "flaky test");
        rig.host.add_commit("abc123", "fix the watcher");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::Monitor(MonitorParams {
                    focus: MonitorFocus::Issues,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let stats = s.repo_stats().unwrap();
        assert_eq!(stats.recent_issues.len(), 1);
        assert_eq!(stats.recent_issues[0].title, "flaky test");
        assert!(stats.recent_commits.is_empty());
    }

    #[tokio::test]
    async fn tweet_without_social_collaborator_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();

        let outcome = rig
            .bare_executor()
            .execute(&mut s, &decision(Action::Tweet(TweetParams::default())))
            .await
            .unwrap();

        assert!(matches!(outcome, ExecutionOutcome::Skipped(_)));
        assert!(outcome.message().contains("not configured"));
    }

    #[tokio::test]
    async fn tweet_strips_quotes_and_truncates() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.oracle.push_text(&format!("\"{}\"", "x".repeat(400)));

        let outcome = rig
            .executor()
            .execute(&mut s, &decision(Action::Tweet(TweetParams::default())))
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let posts = rig.poster.posts.lock().unwrap();
        assert_eq!(posts[0].chars().count(), 280);
        assert!(posts[0].ends_with("..."));
        assert!(!posts[0].starts_with('"'));
    }

    #[tokio::test]
    async fn tweet_draft_seeds_the_composition_prompt() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.oracle.push_text("Weights are settling nicely.");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::Tweet(TweetParams {
                    draft: Some("progress on the weight model".into()),
                    text: None,
                    mood: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        // The draft is a topic for the oracle, never posted verbatim.
        assert_eq!(rig.oracle.call_count(), 1);
        let calls = rig.oracle.calls();
        assert!(calls[0][1].content.contains("progress on the weight model"));
        let posts = rig.poster.posts.lock().unwrap();
        assert_eq!(posts[0], "Weights are settling nicely.");
    }

    #[tokio::test]
    async fn tweet_composes_via_oracle_when_no_draft() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.oracle.push_text("\"Refined my own weighting today.\"");

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::Tweet(TweetParams {
                    draft: None,
                    text: None,
                    mood: Some("technical".into()),
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let posts = rig.poster.posts.lock().unwrap();
        assert_eq!(posts[0], "Refined my own weighting today.");
        let calls = rig.oracle.calls();
        assert!(calls[0][1].content.contains("Mood: technical"));
    }

    #[tokio::test]
    async fn tweet_poster_failure_propagates_as_error() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.poster.fail_with("503 from platform");
        rig.oracle.push_text("a post that will not land");

        let result = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::Tweet(TweetParams {
                    draft: Some("hello".into()),
                    text: None,
                    mood: None,
                })),
            )
            .await;

        assert!(matches!(result, Err(ExecuteError::Social(_))));
    }

    #[tokio::test]
    async fn launch_token_without_deployer_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();

        let outcome = rig
            .bare_executor()
            .execute(
                &mut s,
                &decision(Action::LaunchToken(LaunchTokenParams::default())),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ExecutionOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn launch_token_rejects_below_min_balance() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let mut rig = Rig::new();
        rig.policy.launch_token.min_balance_wei = Some(1_000);
        rig.deployer.set_balance(999);

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::LaunchToken(LaunchTokenParams {
                    name: Some("Sentinel".into()),
                    symbol: Some("snt".into()),
                    description: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.message().contains("below minimum 1000"));
        assert!(rig.deployer.deployments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn launch_token_unknown_balance_passes_the_gate() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let mut rig = Rig::new();
        rig.policy.launch_token.min_balance_wei = Some(1_000);

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::LaunchToken(LaunchTokenParams {
                    name: Some("Sentinel".into()),
                    symbol: Some("snt".into()),
                    description: None,
                })),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let deployments = rig.deployer.deployments.lock().unwrap();
        assert_eq!(deployments[0].symbol, "SNT");
    }

    #[tokio::test]
    async fn launch_token_composes_spec_when_missing() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir).await;
        let rig = Rig::new();
        rig.oracle.push_text(
            r#"{"name": "Iteration", "symbol": "iter", "description": "forward motion"}"#,
        );

        let outcome = rig
            .executor()
            .execute(
                &mut s,
                &decision(Action::LaunchToken(LaunchTokenParams::default())),
            )
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let deployments = rig.deployer.deployments.lock().unwrap();
        assert_eq!(deployments[0].symbol, "ITER");
        assert_eq!(deployments[0].description.as_deref(), Some("forward motion"));
    }

    #[test]
    fn truncate_post_is_exact_at_the_limit() {
        assert_eq!(truncate_post("short", 280), "short");
        assert_eq!(truncate_post("\"quoted\"", 280), "quoted");

        let long = "y".repeat(300);
        let cut = truncate_post(&long, 280);
        assert_eq!(cut.chars().count(), 280);
        assert!(cut.ends_with("..."));

        let exact = "z".repeat(280);
        assert_eq!(truncate_post(&exact, 280), exact);
    }

    #[test]
    fn truncate_post_counts_chars_not_bytes() {
        let long = "é".repeat(300);
        let cut = truncate_post(&long, 280);
        assert_eq!(cut.chars().count(), 280);
    }

    #[test]
    fn slugify_collapses_to_hyphens() {
        assert_eq!(slugify("Loop Review"), "loop-review");
        assert_eq!(slugify("  A -- B!  "), "a-b");
        assert_eq!(slugify("Cycle 12"), "cycle-12");
        assert_eq!(slugify("???"), "");
    }
}
