//! Multi-pattern search orchestration.
//!
//! Runs the build → solve → evaluate → project pipeline up to three
//! times, sequentially, each attempt under its own time budget:
//!
//! 1. **baseline** — the standard configuration. Infeasibility here is
//!    fatal for the whole run and reported with the raw solver status.
//! 2. **diverse** — the same constraints plus a hard floor on the Hamming
//!    distance to the baseline assignment. Infeasibility or timeout just
//!    drops this pattern.
//! 3. **flattened** — the heavy workload/headcount flattening weights.
//!    Same non-fatal semantics as the diverse pattern.
//!
//! Every successful pattern is re-scored by the independent evaluator
//! before it is returned; a disagreement with the solver's objective
//! aborts the run as a defect.

use log::{info, warn};
use serde::Serialize;
use std::fmt;

use crate::cp::ShiftModelBuilder;
use crate::error::ScheduleError;
use crate::evaluator::{evaluate, PenaltyBreakdown};
use crate::models::{
    ClassifiedRequests, EventLoad, MonthCalendar, Roster, RuleConfiguration, ShiftAssignment,
};
use crate::projector::{project, DailySummary, StatusCalendar};
use crate::rules::RuleContext;
use crate::solver::{SolveOutcome, SolveParams, SolveStatus, SolverBackend};

/// Which search pattern produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternKind {
    /// Standard configuration.
    Baseline,
    /// Hamming-distance floor against the baseline.
    Diverse,
    /// Heavy flattening weights.
    Flattened,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternKind::Baseline => "baseline",
            PatternKind::Diverse => "diverse",
            PatternKind::Flattened => "flattened",
        };
        f.write_str(name)
    }
}

/// One successful pattern: the assignment and everything derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct PatternResult {
    /// Pattern identity.
    pub kind: PatternKind,
    /// Solver status (optimal or time-limited feasible).
    pub status: SolveStatus,
    /// Achieved objective value.
    pub objective: i64,
    /// The solved assignment.
    pub assignment: ShiftAssignment,
    /// Rule-by-rule penalty breakdown (verified against `objective`).
    pub breakdown: PenaltyBreakdown,
    /// Per-employee status calendar.
    pub statuses: StatusCalendar,
    /// Per-day aggregate summary.
    pub summary: Vec<DailySummary>,
}

/// All patterns that succeeded, baseline first.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Successful patterns in attempt order.
    pub patterns: Vec<PatternResult>,
}

impl SearchOutcome {
    /// The baseline pattern (always present on success).
    pub fn baseline(&self) -> &PatternResult {
        &self.patterns[0]
    }

    /// A pattern by kind, if it succeeded.
    pub fn pattern(&self, kind: PatternKind) -> Option<&PatternResult> {
        self.patterns.iter().find(|p| p.kind == kind)
    }
}

/// The three-pattern search orchestrator over an injected backend.
pub struct PatternSearch<S> {
    solver: S,
}

impl<S: SolverBackend> PatternSearch<S> {
    /// Creates an orchestrator over a backend.
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Runs the full search for one month.
    pub fn run(
        &self,
        roster: &Roster,
        calendar: &MonthCalendar,
        requests: &ClassifiedRequests,
        event_load: &EventLoad,
        config: &RuleConfiguration,
    ) -> Result<SearchOutcome, ScheduleError> {
        event_load.validate(calendar)?;
        let params = SolveParams {
            time_limit: config.time_limit,
            ..SolveParams::default()
        };
        info!(
            "scheduling {} employees over {} days ({}-{:02})",
            roster.len(),
            calendar.num_days(),
            calendar.year(),
            calendar.month()
        );

        let ctx = RuleContext::new(roster, calendar, requests, config, event_load);
        let builder = ShiftModelBuilder::new(&ctx);

        // Pattern 1: fatal on anything but a solution.
        let outcome = self.solver.solve(&builder.build(), &params);
        if !outcome.status.is_solution() {
            return match outcome.status {
                SolveStatus::Error => Err(ScheduleError::Solver(
                    outcome.message.unwrap_or_else(|| "unspecified backend failure".into()),
                )),
                status => Err(ScheduleError::Infeasible { status }),
            };
        }
        let baseline = finish_pattern(&ctx, PatternKind::Baseline, outcome)?;
        info!(
            "baseline pattern solved: status {}, objective {}",
            baseline.status, baseline.objective
        );
        let reference = baseline.assignment.clone();
        let mut patterns = vec![baseline];

        // Pattern 2: diversity floor, non-fatal.
        let model = builder.build_with_distance(&reference, config.min_diversity);
        let outcome = self.solver.solve(&model, &params);
        if outcome.status.is_solution() {
            let result = finish_pattern(&ctx, PatternKind::Diverse, outcome)?;
            info!(
                "diverse pattern solved: status {}, objective {}",
                result.status, result.objective
            );
            patterns.push(result);
        } else {
            warn!("diverse pattern omitted: solver reported {}", outcome.status);
        }

        // Pattern 3: heavy flattening weights, non-fatal.
        let heavy_config = config.emphasized();
        let heavy_ctx = RuleContext::new(roster, calendar, requests, &heavy_config, event_load);
        let model = ShiftModelBuilder::new(&heavy_ctx).build();
        let outcome = self.solver.solve(&model, &params);
        if outcome.status.is_solution() {
            let result = finish_pattern(&heavy_ctx, PatternKind::Flattened, outcome)?;
            info!(
                "flattened pattern solved: status {}, objective {}",
                result.status, result.objective
            );
            patterns.push(result);
        } else {
            warn!(
                "flattened pattern omitted: solver reported {}",
                outcome.status
            );
        }

        Ok(SearchOutcome { patterns })
    }
}

/// Evaluates, verifies, and projects one solved pattern.
fn finish_pattern(
    ctx: &RuleContext,
    kind: PatternKind,
    outcome: SolveOutcome,
) -> Result<PatternResult, ScheduleError> {
    let works = outcome.works.ok_or_else(|| {
        ScheduleError::Solver("backend returned a solution status without a valuation".into())
    })?;
    let objective = outcome.objective.ok_or_else(|| {
        ScheduleError::Solver("backend returned a solution status without an objective".into())
    })?;
    let assignment = ShiftAssignment::new(ctx.roster.len(), ctx.calendar.num_days(), works);

    let breakdown = evaluate(ctx, &assignment);
    breakdown.verify(objective)?;

    let (statuses, summary) = project(
        ctx.roster,
        ctx.calendar,
        ctx.requests,
        ctx.event_load,
        &assignment,
    );
    Ok(PatternResult {
        kind,
        status: outcome.status,
        objective,
        assignment,
        breakdown,
        statuses,
        summary,
    })
}
