//! Cycle driver.
//!
//! Sequences one full cycle: start, decide, execute, log, save. Whatever
//! happens during execution, the cycle logs exactly one action record and
//! saves exactly once before returning.

use tracing::{error, info};

use crate::domain::Decision;
use crate::engine::{ActionExecutor, DecisionEngine, StateStore, StateStoreError};

/// What one cycle did, for the process exit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub action: String,
    pub result: String,
}

/// Run one complete decision-and-action cycle.
///
/// Collaborator failures during execution are captured into the action
/// record's result, not propagated; the only error this returns is a failed
/// save, after the record has already been appended in memory.
pub async fn run_cycle(
    store: &mut StateStore,
    engine: &mut DecisionEngine<'_>,
    executor: &ActionExecutor<'_>,
) -> Result<CycleReport, StateStoreError> {
    store.start_cycle();
    let cycle = store.cycle_count();
    info!(cycle, "cycle started");

    let decision: Decision = engine.decide(store).await;
    let kind = decision.kind();
    info!(cycle, action = %kind, reasoning = %decision.reasoning, "decided");

    let result = match executor.execute(store, &decision).await {
        Ok(outcome) => outcome.to_string(),
        Err(e) => {
            error!(cycle, action = %kind, error = %e, "execution failed");
            format!("ERROR: {e}")
        }
    };

    store.log_action(kind, &decision.reasoning, &result);
    store.save().await?;
    info!(cycle, action = %kind, result = %result, "cycle finished");

    Ok(CycleReport {
        cycle,
        action: kind.as_str().to_string(),
        result,
    })
}
