//! Domain model - pure data types and pure algorithms.
//!
//! Nothing in this module performs I/O. The weight model is a pure function
//! of action history; the state types are plain serde records matching the
//! persisted JSON layout.

pub mod action;
pub mod outcome;
pub mod state;
pub mod weights;

pub use action::{
    Action, ActionKind, CreateIssueParams, Decision, JournalParams, LaunchTokenParams,
    MonitorFocus, MonitorParams, SelfImproveParams, TweetParams,
};
pub use outcome::ExecutionOutcome;
pub use state::{
    ActionRecord, CommitDigest, CycleState, Goal, GoalStatus, IssueDigest, ProgressNote, RepoStats,
};
pub use weights::{ActionWeights, WeightModel, WeightPolicy, WeightSnapshot};
