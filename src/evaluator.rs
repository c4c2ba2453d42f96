//! Independent penalty re-scoring.
//!
//! Recomputes every active rule's contribution for a concrete assignment
//! — any candidate, not only solver output — straight from the rule
//! table, without touching the linear model. Supports auditing a
//! schedule's score and catching formula divergence: for a solver-
//! produced assignment the recomputed total must equal the reported
//! objective exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ScheduleError;
use crate::models::ShiftAssignment;
use crate::rules::{soft_rules, RuleContext, RuleId};

/// Rule-by-rule penalty contributions for one assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    /// Contribution per active rule (zero entries included).
    pub by_rule: BTreeMap<RuleId, i64>,
}

impl PenaltyBreakdown {
    /// Sum of all contributions.
    pub fn total(&self) -> i64 {
        self.by_rule.values().sum()
    }

    /// Contribution of one rule (zero when inactive).
    pub fn of(&self, rule: RuleId) -> i64 {
        self.by_rule.get(&rule).copied().unwrap_or(0)
    }

    /// Checks the recomputed total against a solver-reported objective.
    ///
    /// Disagreement means the model terms and the rule formulas have
    /// diverged — a defect, surfaced as an error rather than accepted.
    pub fn verify(&self, reported: i64) -> Result<(), ScheduleError> {
        let recomputed = self.total();
        if recomputed == reported {
            Ok(())
        } else {
            Err(ScheduleError::BreakdownMismatch {
                recomputed,
                reported,
            })
        }
    }
}

/// Scores an assignment through every active rule.
pub fn evaluate(ctx: &RuleContext, assignment: &ShiftAssignment) -> PenaltyBreakdown {
    let by_rule = soft_rules(ctx.config)
        .iter()
        .map(|rule| (rule.id, rule.score(ctx, assignment)))
        .collect();
    PenaltyBreakdown { by_rule }
}
