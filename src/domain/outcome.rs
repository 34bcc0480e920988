//! Execution outcomes.
//!
//! Guardrail rejections and capability skips are values, not errors: the
//! cycle proceeds to log and save normally whichever variant comes back.
//! Only unexpected collaborator failures travel as errors.

use std::fmt;

/// What happened when an action was executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The side-effect sequence ran to completion.
    Completed(String),
    /// A guardrail stopped the action before any side effect.
    Rejected(String),
    /// A required collaborator is not configured, or there was nothing to do.
    Skipped(String),
}

impl ExecutionOutcome {
    pub fn message(&self) -> &str {
        match self {
            ExecutionOutcome::Completed(m)
            | ExecutionOutcome::Rejected(m)
            | ExecutionOutcome::Skipped(m) => m,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed(_))
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let outcome = ExecutionOutcome::Rejected("quota exceeded".into());
        assert_eq!(outcome.to_string(), "quota exceeded");
        assert!(!outcome.is_completed());
        assert!(ExecutionOutcome::Completed("ok".into()).is_completed());
    }
}
