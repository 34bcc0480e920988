//! Action weight model.
//!
//! Computes a per-action preference score from the trailing action history.
//! The scores are advisory context handed to the oracle; they do not decide
//! the outcome except through the deterministic overrides in the decision
//! engine. Pure function of history and policy - no I/O, no clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::ActionKind;
use super::state::ActionRecord;

/// Tunable constants for the weight model. Policy, not algorithm: the
/// qualitative shape (super-linear frequency penalty, overdue boosts,
/// clustering penalty, bounded clamp) is fixed; the numbers are not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightPolicy {
    /// Baseline weight per action kind. Kinds absent from the table get 1.0.
    #[serde(default = "default_baselines")]
    pub baselines: BTreeMap<ActionKind, f64>,
    /// Fixed multiplicative decay applied to every weight each cycle.
    #[serde(default = "default_decay")]
    pub decay: f64,
    /// Exponent of the frequency-share penalty. Must be >= 1.5 so heavy
    /// repetition is penalized disproportionately.
    #[serde(default = "default_frequency_exponent")]
    pub frequency_exponent: f64,
    /// Lower bound of the frequency penalty multiplier.
    #[serde(default = "default_frequency_floor")]
    pub frequency_floor: f64,
    /// Up-weight for actions absent from the window entirely.
    #[serde(default = "default_overdue_boost")]
    pub overdue_boost: f64,
    /// Smaller up-weight for actions last seen long ago.
    #[serde(default = "default_stale_boost")]
    pub stale_boost: f64,
    /// Fraction of the window size beyond which an occurrence counts as
    /// long ago.
    #[serde(default = "default_stale_after_fraction")]
    pub stale_after_fraction: f64,
    /// Mean inter-occurrence gap below this fraction of the window size
    /// counts as bursty use.
    #[serde(default = "default_cluster_fraction")]
    pub cluster_fraction: f64,
    /// Down-weight applied to bursty use.
    #[serde(default = "default_cluster_penalty")]
    pub cluster_penalty: f64,
    /// Clamp floor as a factor of the baseline.
    #[serde(default = "default_min_factor")]
    pub min_factor: f64,
    /// Clamp ceiling as a factor of the baseline.
    #[serde(default = "default_max_factor")]
    pub max_factor: f64,
}

fn default_baselines() -> BTreeMap<ActionKind, f64> {
    BTreeMap::from([
        (ActionKind::SelfImprove, 1.0),
        (ActionKind::CreateIssue, 0.6),
        (ActionKind::Journal, 0.5),
        (ActionKind::Monitor, 0.4),
        (ActionKind::Tweet, 2.0),
        (ActionKind::LaunchToken, 0.8),
    ])
}

fn default_decay() -> f64 {
    0.95
}

fn default_frequency_exponent() -> f64 {
    2.0
}

fn default_frequency_floor() -> f64 {
    0.1
}

fn default_overdue_boost() -> f64 {
    1.5
}

fn default_stale_boost() -> f64 {
    1.2
}

fn default_stale_after_fraction() -> f64 {
    0.5
}

fn default_cluster_fraction() -> f64 {
    1.0 / 3.0
}

fn default_cluster_penalty() -> f64 {
    0.75
}

fn default_min_factor() -> f64 {
    0.1
}

fn default_max_factor() -> f64 {
    3.0
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            baselines: default_baselines(),
            decay: default_decay(),
            frequency_exponent: default_frequency_exponent(),
            frequency_floor: default_frequency_floor(),
            overdue_boost: default_overdue_boost(),
            stale_boost: default_stale_boost(),
            stale_after_fraction: default_stale_after_fraction(),
            cluster_fraction: default_cluster_fraction(),
            cluster_penalty: default_cluster_penalty(),
            min_factor: default_min_factor(),
            max_factor: default_max_factor(),
        }
    }
}

impl WeightPolicy {
    pub fn baseline(&self, kind: ActionKind) -> f64 {
        self.baselines.get(&kind).copied().unwrap_or(1.0)
    }
}

/// Per-action preference scores for one cycle. Recomputed every cycle,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionWeights(BTreeMap<ActionKind, f64>);

impl ActionWeights {
    pub fn get(&self, kind: ActionKind) -> f64 {
        self.0.get(&kind).copied().unwrap_or(0.0)
    }

    /// Force a weight, used when a cooldown zeroes an action for context.
    pub fn set(&mut self, kind: ActionKind, weight: f64) {
        self.0.insert(kind, weight);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionKind, f64)> + '_ {
        self.0.iter().map(|(k, w)| (*k, *w))
    }
}

/// A timestamped copy of one cycle's weights, kept in memory for pattern
/// inspection. No durability contract.
#[derive(Debug, Clone)]
pub struct WeightSnapshot {
    pub timestamp: DateTime<Utc>,
    pub weights: ActionWeights,
}

const SNAPSHOT_CAP: usize = 100;

/// Computes weights and keeps a bounded in-memory history of them.
#[derive(Debug, Clone)]
pub struct WeightModel {
    policy: WeightPolicy,
    snapshots: Vec<WeightSnapshot>,
}

impl WeightModel {
    pub fn new(policy: WeightPolicy) -> Self {
        Self {
            policy,
            snapshots: Vec::new(),
        }
    }

    /// Compute this cycle's weights from the trailing window and record a
    /// snapshot.
    pub fn compute(&mut self, window: &[&ActionRecord]) -> ActionWeights {
        let weights = compute_weights(window, &self.policy);
        self.snapshots.push(WeightSnapshot {
            timestamp: Utc::now(),
            weights: weights.clone(),
        });
        if self.snapshots.len() > SNAPSHOT_CAP {
            self.snapshots.remove(0);
        }
        weights
    }

    pub fn snapshots(&self) -> &[WeightSnapshot] {
        &self.snapshots
    }
}

/// Pure weight computation over a trailing action window.
///
/// An empty window returns each baseline times the per-cycle decay, clamped.
/// Otherwise, per action kind: frequency-share penalty (super-linear),
/// recency boosts (absent > stale), clustering penalty for bursty use, then
/// a clamp into `[min_factor, max_factor]` of the baseline.
pub fn compute_weights(window: &[&ActionRecord], policy: &WeightPolicy) -> ActionWeights {
    let total = window.len();
    let mut out = BTreeMap::new();

    for kind in ActionKind::ALL {
        let base = policy.baseline(kind);
        let mut weight = base * policy.decay;

        if total > 0 {
            let positions: Vec<usize> = window
                .iter()
                .enumerate()
                .filter(|(_, r)| r.action == kind.as_str())
                .map(|(i, _)| i)
                .collect();
            let frequency = positions.len();

            if frequency > 0 {
                let share = frequency as f64 / total as f64;
                let penalty = (1.0 - share.powf(policy.frequency_exponent))
                    .max(policy.frequency_floor);
                weight *= penalty;

                // Distance of the last occurrence from the window's end.
                let last_distance = total - 1 - positions[positions.len() - 1];
                if last_distance as f64 > policy.stale_after_fraction * total as f64 {
                    weight *= policy.stale_boost;
                }

                if frequency >= 2 {
                    let span = (positions[positions.len() - 1] - positions[0]) as f64;
                    let mean_gap = span / (frequency - 1) as f64;
                    if mean_gap < policy.cluster_fraction * total as f64 {
                        weight *= policy.cluster_penalty;
                    }
                }
            } else {
                // Overdue: the action is absent from the window entirely.
                weight *= policy.overdue_boost;
            }
        }

        let clamped = weight
            .max(policy.min_factor * base)
            .min(policy.max_factor * base);
        out.insert(kind, clamped);
    }

    ActionWeights(out)
}
