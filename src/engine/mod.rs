//! Engine - the decision-and-action cycle.
//!
//! `StateStore` owns the persisted record, `DecisionEngine` produces exactly
//! one decision per cycle (oracle-assisted or forced), `ActionExecutor`
//! enforces guardrails and performs side effects, and `run_cycle` sequences
//! them with a guaranteed save.

mod decision;
mod driver;
mod executor;
mod state_store;

pub use decision::DecisionEngine;
pub use driver::{run_cycle, CycleReport};
pub use executor::{truncate_post, ActionExecutor, ExecuteError};
pub use state_store::{StateStore, StateStoreError};
