//! Action vocabulary and decisions.
//!
//! The agent can perform exactly one action per cycle, drawn from a closed
//! vocabulary. The oracle's loosely-typed JSON reply is parsed into the
//! [`Action`] tagged union by the decision engine; unrecognized tags never
//! reach the executor - they fold into the journal fallback.

use serde::{Deserialize, Serialize};

/// One member of the fixed action vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SelfImprove,
    CreateIssue,
    Journal,
    Monitor,
    Tweet,
    LaunchToken,
}

impl ActionKind {
    /// Every action kind, in stable order.
    pub const ALL: [ActionKind; 6] = [
        ActionKind::SelfImprove,
        ActionKind::CreateIssue,
        ActionKind::Journal,
        ActionKind::Monitor,
        ActionKind::Tweet,
        ActionKind::LaunchToken,
    ];

    /// The wire/log name of this action kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SelfImprove => "self_improve",
            ActionKind::CreateIssue => "create_issue",
            ActionKind::Journal => "journal",
            ActionKind::Monitor => "monitor",
            ActionKind::Tweet => "tweet",
            ActionKind::LaunchToken => "launch_token",
        }
    }

    /// Parse a wire/log name back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a self-improvement change request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfImproveParams {
    /// Repository path of the file to rewrite.
    #[serde(default)]
    pub target_file: String,
    /// What the rewrite should accomplish.
    #[serde(default)]
    pub improvement_description: Option<String>,
}

/// Parameters for opening a tracked issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateIssueParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Parameters for a journal entry. All optional; the executor fills defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Seed text the oracle expands into full prose.
    #[serde(default)]
    pub draft: Option<String>,
}

/// What additional detail a monitor pass should fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorFocus {
    #[default]
    General,
    Issues,
    Commits,
    /// Unrecognized focus values degrade to a metrics-only pass.
    #[serde(other)]
    Other,
}

/// Parameters for a monitor pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorParams {
    #[serde(default)]
    pub focus: MonitorFocus,
}

/// Parameters for a social post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweetParams {
    #[serde(default)]
    pub draft: Option<String>,
    /// Alternate field some oracle replies use for the draft.
    #[serde(default)]
    pub text: Option<String>,
    /// Style parameter; for forced overrides this is drawn from the policy's
    /// fixed mood set.
    #[serde(default)]
    pub mood: Option<String>,
}

impl TweetParams {
    /// The draft text, whichever field carried it.
    pub fn seed(&self) -> Option<&str> {
        self.draft.as_deref().or(self.text.as_deref())
    }
}

/// Parameters for deploying a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchTokenParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated action with its per-kind payload.
#[derive(Debug, Clone)]
pub enum Action {
    SelfImprove(SelfImproveParams),
    CreateIssue(CreateIssueParams),
    Journal(JournalParams),
    Monitor(MonitorParams),
    Tweet(TweetParams),
    LaunchToken(LaunchTokenParams),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::SelfImprove(_) => ActionKind::SelfImprove,
            Action::CreateIssue(_) => ActionKind::CreateIssue,
            Action::Journal(_) => ActionKind::Journal,
            Action::Monitor(_) => ActionKind::Monitor,
            Action::Tweet(_) => ActionKind::Tweet,
            Action::LaunchToken(_) => ActionKind::LaunchToken,
        }
    }

    /// Build an action of the given kind with default parameters, as used by
    /// deterministic overrides. The mood only applies to the tweet payload.
    pub fn forced(kind: ActionKind, mood: Option<String>) -> Self {
        match kind {
            ActionKind::SelfImprove => Action::SelfImprove(SelfImproveParams::default()),
            ActionKind::CreateIssue => Action::CreateIssue(CreateIssueParams::default()),
            ActionKind::Journal => Action::Journal(JournalParams::default()),
            ActionKind::Monitor => Action::Monitor(MonitorParams::default()),
            ActionKind::Tweet => Action::Tweet(TweetParams {
                mood,
                ..TweetParams::default()
            }),
            ActionKind::LaunchToken => Action::LaunchToken(LaunchTokenParams::default()),
        }
    }
}

/// The outcome of a decision phase: one action plus the oracle's (or the
/// override's) stated reasoning. Ephemeral - never persisted as-is.
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Action,
    pub reasoning: String,
}

impl Decision {
    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}
