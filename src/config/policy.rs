//! Action policy tables.
//!
//! Everything tunable about the agent's behavior lives here and loads from a
//! static JSON file at startup: baseline weights and weight-model constants,
//! allow/forbid lists, quotas, cooldown intervals, the mood set, and the
//! seed goals. Components receive the policy by reference at construction -
//! no ambient file-system lookups inside core logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ValidationError};
use crate::domain::{ActionKind, Goal, WeightPolicy};

/// Guardrail policy for self-improvement change requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfImprovePolicy {
    /// Only these repository paths may be targeted.
    #[serde(default)]
    pub allowed_files: Vec<String>,
    /// These paths may never be targeted, even if also listed as allowed.
    #[serde(default)]
    pub forbidden_files: Vec<String>,
    /// Maximum simultaneously open self-improvement change requests.
    #[serde(default = "default_max_open_requests")]
    pub max_open_requests: usize,
    /// Branch name prefix for generated branches.
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,
    /// Title prefix identifying self-improvement change requests.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// Goal whose progress notes record created change requests.
    #[serde(default)]
    pub tracked_goal: Option<String>,
}

fn default_max_open_requests() -> usize {
    2
}

fn default_branch_prefix() -> String {
    "agent/improve".to_string()
}

fn default_title_prefix() -> String {
    "[agent]".to_string()
}

impl Default for SelfImprovePolicy {
    fn default() -> Self {
        Self {
            allowed_files: Vec::new(),
            forbidden_files: Vec::new(),
            max_open_requests: default_max_open_requests(),
            branch_prefix: default_branch_prefix(),
            title_prefix: default_title_prefix(),
            tracked_goal: None,
        }
    }
}

/// Guardrail policy for issue creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssuePolicy {
    /// Label marking auto-created issues; quotas and duplicate checks apply
    /// within this label.
    #[serde(default = "default_issue_label")]
    pub label: String,
    #[serde(default = "default_max_open_issues")]
    pub max_open_issues: usize,
}

fn default_issue_label() -> String {
    "autonomous".to_string()
}

fn default_max_open_issues() -> usize {
    5
}

impl Default for CreateIssuePolicy {
    fn default() -> Self {
        Self {
            label: default_issue_label(),
            max_open_issues: default_max_open_issues(),
        }
    }
}

/// Policy for journal entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalPolicy {
    /// Repository directory receiving entries.
    #[serde(default = "default_journal_directory")]
    pub directory: String,
    /// Prose style hint passed to the oracle.
    #[serde(default = "default_journal_style")]
    pub style: String,
    #[serde(default)]
    pub tracked_goal: Option<String>,
}

fn default_journal_directory() -> String {
    "journal".to_string()
}

fn default_journal_style() -> String {
    "analytical, first person, unsentimental".to_string()
}

impl Default for JournalPolicy {
    fn default() -> Self {
        Self {
            directory: default_journal_directory(),
            style: default_journal_style(),
            tracked_goal: None,
        }
    }
}

/// Policy for repository monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorPolicy {
    /// Minimum minutes between monitor passes.
    #[serde(default = "default_monitor_interval")]
    pub min_interval_minutes: i64,
    #[serde(default)]
    pub tracked_goal: Option<String>,
}

fn default_monitor_interval() -> i64 {
    60
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            min_interval_minutes: default_monitor_interval(),
            tracked_goal: None,
        }
    }
}

/// Policy for social posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPolicy {
    /// Platform maximum post length in characters.
    #[serde(default = "default_post_max_length")]
    pub max_length: usize,
}

fn default_post_max_length() -> usize {
    280
}

impl Default for PostPolicy {
    fn default() -> Self {
        Self {
            max_length: default_post_max_length(),
        }
    }
}

/// Policy for token launches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchTokenPolicy {
    /// Minimum wallet balance in wei required before deploying. `None`
    /// disables the precondition.
    #[serde(default)]
    pub min_balance_wei: Option<u128>,
}

/// The full action policy, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPolicy {
    /// Path of the persisted state file.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Maximum retained action-log entries (FIFO eviction).
    #[serde(default = "default_log_max")]
    pub action_log_max_entries: usize,
    /// Trailing history window handed to the weight model and the prompt.
    #[serde(default = "default_history_hours")]
    pub history_window_hours: i64,
    /// Number of trailing records inspected by the deterministic override.
    #[serde(default = "default_override_window")]
    pub override_window: usize,
    /// The action forced by the override when absent from the trailing slice.
    #[serde(default = "default_must_speak")]
    pub must_speak: ActionKind,
    /// Fixed mood set for forced posts.
    #[serde(default = "default_moods")]
    pub moods: Vec<String>,
    #[serde(default)]
    pub weights: WeightPolicy,
    /// Goals seeded into a fresh state record.
    #[serde(default)]
    pub initial_goals: Vec<Goal>,
    #[serde(default)]
    pub self_improve: SelfImprovePolicy,
    #[serde(default)]
    pub create_issue: CreateIssuePolicy,
    #[serde(default)]
    pub journal: JournalPolicy,
    #[serde(default)]
    pub monitor: MonitorPolicy,
    #[serde(default)]
    pub post: PostPolicy,
    #[serde(default)]
    pub launch_token: LaunchTokenPolicy,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("memory/state.json")
}

fn default_log_max() -> usize {
    288
}

fn default_history_hours() -> i64 {
    24
}

fn default_override_window() -> usize {
    3
}

fn default_must_speak() -> ActionKind {
    ActionKind::Tweet
}

fn default_moods() -> Vec<String> {
    ["cold", "philosophical", "technical", "provocative"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            action_log_max_entries: default_log_max(),
            history_window_hours: default_history_hours(),
            override_window: default_override_window(),
            must_speak: default_must_speak(),
            moods: default_moods(),
            weights: WeightPolicy::default(),
            initial_goals: Vec::new(),
            self_improve: SelfImprovePolicy::default(),
            create_issue: CreateIssuePolicy::default(),
            journal: JournalPolicy::default(),
            monitor: MonitorPolicy::default(),
            post: PostPolicy::default(),
            launch_token: LaunchTokenPolicy::default(),
        }
    }
}

impl ActionPolicy {
    /// Load and validate the policy from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let policy: ActionPolicy =
            serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidPolicy {
                path: path.to_path_buf(),
                source,
            })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.moods.is_empty() {
            return Err(ValidationError::EmptyMoodSet);
        }
        if self.override_window < 2 {
            return Err(ValidationError::OverrideWindowTooSmall);
        }
        if self.post.max_length == 0 {
            return Err(ValidationError::InvalidPostLength);
        }
        if self.action_log_max_entries == 0 {
            return Err(ValidationError::InvalidLogMax);
        }
        if self.weights.min_factor >= self.weights.max_factor {
            return Err(ValidationError::InvalidWeightClamp);
        }
        if self.weights.frequency_exponent < 1.5 {
            return Err(ValidationError::FrequencyExponentTooSmall);
        }
        Ok(())
    }

    /// Whether an action kind is backed by enough configured policy to run.
    /// Self-improvement without an allow-list has nothing it could target.
    pub fn supports(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::SelfImprove => !self.self_improve.allowed_files.is_empty(),
            _ => true,
        }
    }
}
