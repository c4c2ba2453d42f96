//! Error types for the rostering pipeline.
//!
//! One enum covers the whole taxonomy: configuration problems (caught
//! before any solve is attempted), infeasibility of the baseline pattern
//! (fatal for the run), solver failures, and breakdown mismatches between
//! the solver's reported objective and the independent penalty evaluator.

use thiserror::Error;

use crate::models::RequestKind;
use crate::solver::SolveStatus;

/// Errors produced while building or solving a monthly roster.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Two roster rows share the same employee id.
    #[error("duplicate employee id '{0}' in roster")]
    DuplicateEmployee(String),

    /// The year/month pair does not denote a calendar month.
    #[error("invalid calendar month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// A request entry points at a day outside the month.
    #[error("request day {day} for employee '{employee}' is outside 1..={num_days}")]
    DayOutOfRange {
        employee: String,
        day: u32,
        num_days: u32,
    },

    /// Two different request kinds were filed for the same employee-day cell.
    #[error("conflicting requests for employee '{employee}' on day {day}: '{first}' vs '{second}'")]
    ConflictingRequest {
        employee: String,
        day: u32,
        first: RequestKind,
        second: RequestKind,
    },

    /// Event workload was supplied for a Sunday (must always be zero there).
    #[error("event load on day {0} falls on a Sunday and must be zero")]
    SundayEventLoad(u32),

    /// Event workload was supplied for a day outside the month.
    #[error("event load day {day} is outside 1..={num_days}")]
    EventDayOutOfRange { day: u32, num_days: u32 },

    /// The baseline pattern's hard constraints contradict each other.
    #[error("no feasible schedule: solver reported {status}")]
    Infeasible { status: SolveStatus },

    /// The solver backend failed outright.
    #[error("solver failure: {0}")]
    Solver(String),

    /// The independently recomputed penalty total disagrees with the
    /// objective the solver reported. Indicates a formula divergence bug,
    /// never a condition to accept silently.
    #[error("penalty breakdown mismatch: evaluator total {recomputed}, solver reported {reported}")]
    BreakdownMismatch { recomputed: i64, reported: i64 },
}
