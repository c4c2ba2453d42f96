//! Solver backend abstraction.
//!
//! The model builder produces a [`ShiftModel`](crate::cp::ShiftModel);
//! anything that can value its booleans under the hard constraints while
//! minimizing the objective can serve as a backend. The orchestrator
//! takes the backend by generic parameter, so tests inject in-memory
//! mocks and production can wire a real optimizer.

mod greedy;

pub use greedy::GreedySolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::cp::ShiftModel;

/// Terminal status of one solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal within the time budget.
    Optimal,
    /// Feasible solution found, optimality not proven (time-limited).
    Feasible,
    /// Hard constraints are contradictory.
    Infeasible,
    /// The backend failed.
    Error,
}

impl SolveStatus {
    /// Whether the outcome carries a usable assignment.
    pub fn is_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Per-attempt solve parameters.
#[derive(Debug, Clone, Copy)]
pub struct SolveParams {
    /// Wall-clock budget for the attempt.
    pub time_limit: Duration,
    /// Seed for any randomized exploration; fixed seed → reproducible run.
    pub seed: u64,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(20),
            seed: 0x5eed,
        }
    }
}

/// Result of one solve attempt.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Terminal status.
    pub status: SolveStatus,
    /// Valuation of every shift variable (employee-major), when solved.
    pub works: Option<Vec<bool>>,
    /// Achieved objective value, when solved.
    pub objective: Option<i64>,
    /// Backend diagnostic, for the error status.
    pub message: Option<String>,
}

impl SolveOutcome {
    /// A solved outcome.
    pub fn solved(status: SolveStatus, works: Vec<bool>, objective: i64) -> Self {
        debug_assert!(status.is_solution());
        Self {
            status,
            works: Some(works),
            objective: Some(objective),
            message: None,
        }
    }

    /// An infeasible outcome.
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            works: None,
            objective: None,
            message: None,
        }
    }

    /// A failed outcome with a diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolveStatus::Error,
            works: None,
            objective: None,
            message: Some(message.into()),
        }
    }
}

/// A constraint-optimization backend.
pub trait SolverBackend {
    /// Attempts to solve the model within the given parameters.
    fn solve(&self, model: &ShiftModel, params: &SolveParams) -> SolveOutcome;
}
