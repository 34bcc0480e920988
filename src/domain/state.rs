//! Persisted cycle state.
//!
//! These types mirror the JSON state file field-for-field:
//! `{cycle_count, last_cycle, action_log, goals, repo_stats, last_monitor}`.
//! The record is owned exclusively by the running cycle process; mutation
//! goes through the state store, never through shared access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed (or failed) cycle's action, insertion-ordered in the log.
///
/// The action name is kept as a plain string so historical records survive
/// vocabulary changes; helpers compare against [`ActionKind::as_str`].
///
/// [`ActionKind::as_str`]: crate::domain::ActionKind::as_str
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub reasoning: String,
    pub result: String,
}

/// Lifecycle status of a tracked goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Done,
    Abandoned,
}

/// A dated progress note appended to a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressNote {
    pub date: DateTime<Utc>,
    pub note: String,
}

/// A long-lived tracked objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique, sequentially generated id of the form `goal-NNN`. Never reused.
    pub id: String,
    pub title: String,
    pub status: GoalStatus,
    /// Lower is more urgent.
    pub priority: u8,
    #[serde(default)]
    pub progress_notes: Vec<ProgressNote>,
}

/// Digest of a recently seen issue, cached inside [`RepoStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDigest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

/// Digest of a recent commit, cached inside [`RepoStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDigest {
    pub sha: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

/// Last-fetched repository metrics snapshot. Overwritten wholesale on each
/// monitor action - never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,
    pub size_kb: u64,
    #[serde(default)]
    pub recent_issues: Vec<IssueDigest>,
    #[serde(default)]
    pub recent_commits: Vec<CommitDigest>,
    pub fetched_at: DateTime<Utc>,
}

/// The single persisted record for the whole agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState {
    /// Monotonically increasing; incremented exactly once per cycle at start.
    pub cycle_count: u64,
    /// Timestamp of the most recent cycle start.
    pub last_cycle: Option<DateTime<Utc>>,
    /// Insertion-ordered, trimmed FIFO to the configured maximum.
    pub action_log: Vec<ActionRecord>,
    pub goals: Vec<Goal>,
    pub repo_stats: Option<RepoStats>,
    /// Used for the monitor cooldown gate.
    pub last_monitor: Option<DateTime<Utc>>,
}

impl CycleState {
    /// Zeroed defaults plus seed goals, used when no prior record exists.
    pub fn seeded(goals: Vec<Goal>) -> Self {
        Self {
            cycle_count: 0,
            last_cycle: None,
            action_log: Vec::new(),
            goals,
            repo_stats: None,
            last_monitor: None,
        }
    }
}
