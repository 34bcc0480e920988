//! Durable cycle state.
//!
//! Loads the persisted record from a JSON file (or seeds a fresh one), takes
//! all mutations for the running cycle, and writes the record back. The
//! store assumes single-writer access: cycles never overlap by contract of
//! the external scheduler, so no locking is performed.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tokio::fs;
use tracing::debug;

use crate::domain::{ActionKind, ActionRecord, CycleState, Goal, GoalStatus, ProgressNote, RepoStats};

/// State persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Owner of the persisted [`CycleState`] for the duration of one process.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    max_log_entries: usize,
    state: CycleState,
}

impl StateStore {
    /// Load state from disk, or initialize zeroed defaults plus seed goals
    /// if no prior record exists.
    pub async fn load(
        path: impl AsRef<Path>,
        max_log_entries: usize,
        seed_goals: &[Goal],
    ) -> Result<Self, StateStoreError> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StateStoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no prior state, seeding");
                CycleState::seeded(seed_goals.to_vec())
            }
            Err(source) => return Err(StateStoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            max_log_entries,
            state,
        })
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn cycle_count(&self) -> u64 {
        self.state.cycle_count
    }

    /// Increment the cycle counter and stamp the cycle start. Called exactly
    /// once per cycle.
    pub fn start_cycle(&mut self) {
        self.state.cycle_count += 1;
        self.state.last_cycle = Some(Utc::now());
    }

    /// Append a completed action to the log, evicting the oldest entries
    /// beyond the configured maximum.
    pub fn log_action(&mut self, kind: ActionKind, reasoning: &str, result: &str) {
        self.state.action_log.push(ActionRecord {
            cycle: self.state.cycle_count,
            timestamp: Utc::now(),
            action: kind.as_str().to_string(),
            reasoning: reasoning.to_string(),
            result: if result.is_empty() {
                "completed".to_string()
            } else {
                result.to_string()
            },
        });

        let len = self.state.action_log.len();
        if len > self.max_log_entries {
            self.state.action_log.drain(..len - self.max_log_entries);
        }
    }

    /// Actions from the trailing window, oldest first.
    pub fn recent_actions(&self, hours: i64) -> Vec<&ActionRecord> {
        let cutoff = Utc::now() - Duration::hours(hours);
        self.state
            .action_log
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .collect()
    }

    /// The most recent record of the given kind, if any.
    pub fn last_action_of(&self, kind: ActionKind) -> Option<&ActionRecord> {
        self.state
            .action_log
            .iter()
            .rev()
            .find(|r| r.action == kind.as_str())
    }

    pub fn goals(&self) -> &[Goal] {
        &self.state.goals
    }

    /// Add a goal with a fresh sequential id. Ids count up from the highest
    /// ever issued so they are never reused.
    pub fn add_goal(&mut self, title: impl Into<String>, priority: u8) -> String {
        let next = self
            .state
            .goals
            .iter()
            .filter_map(|g| g.id.strip_prefix("goal-"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("goal-{next:03}");
        self.state.goals.push(Goal {
            id: id.clone(),
            title: title.into(),
            status: GoalStatus::Active,
            priority,
            progress_notes: Vec::new(),
        });
        id
    }

    /// Append a progress note and/or change status on a goal. Returns false
    /// if the goal id is unknown.
    pub fn update_goal(
        &mut self,
        goal_id: &str,
        note: Option<&str>,
        status: Option<GoalStatus>,
    ) -> bool {
        let Some(goal) = self.state.goals.iter_mut().find(|g| g.id == goal_id) else {
            return false;
        };
        if let Some(note) = note {
            goal.progress_notes.push(ProgressNote {
                date: Utc::now(),
                note: note.to_string(),
            });
        }
        if let Some(status) = status {
            goal.status = status;
        }
        true
    }

    pub fn repo_stats(&self) -> Option<&RepoStats> {
        self.state.repo_stats.as_ref()
    }

    /// Overwrite the cached metrics snapshot wholesale and stamp the monitor
    /// cooldown.
    pub fn update_repo_stats(&mut self, mut stats: RepoStats) {
        let now = Utc::now();
        stats.fetched_at = now;
        self.state.repo_stats = Some(stats);
        self.state.last_monitor = Some(now);
    }

    /// Whether enough time has passed since the last monitor pass.
    pub fn can_monitor(&self, min_interval_minutes: i64) -> bool {
        match self.state.last_monitor {
            None => true,
            Some(last) => Utc::now() - last >= Duration::minutes(min_interval_minutes),
        }
    }

    /// Persist the record. Creates the parent directory if needed; the file
    /// is overwritten, never deleted.
    pub async fn save(&self) -> Result<(), StateStoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .map_err(|source| StateStoreError::Io {
                        path: dir.to_path_buf(),
                        source,
                    })?;
            }
        }

        // CycleState serialization cannot fail: no maps with non-string keys,
        // no non-finite floats.
        let json = serde_json::to_string_pretty(&self.state).map_err(|source| {
            StateStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, json)
            .await
            .map_err(|source| StateStoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
