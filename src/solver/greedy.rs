//! Deterministic baseline backend.
//!
//! A repair-then-descend heuristic, not an exact optimizer: pin
//! propagation, min-conflicts repair over the linear hard constraints
//! (plateau moves allowed through a short tabu window), then a seeded
//! first-improvement descent on the objective using quota-preserving
//! in-row swaps. Never claims optimality; a model it cannot repair
//! within the move budget is reported infeasible.
//!
//! Kept in-crate so the whole pipeline runs and tests end-to-end without
//! an external optimizer.

use std::collections::VecDeque;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::cp::{CmpOp, HardConstraint, ShiftModel};

use super::{SolveOutcome, SolveParams, SolveStatus, SolverBackend};

/// Baseline repair/descent solver.
#[derive(Debug, Clone)]
pub struct GreedySolver {
    /// Flip budget for the feasibility repair phase.
    pub max_repair_moves: usize,
    /// Iteration budget for the objective descent phase.
    pub descent_moves: usize,
}

impl Default for GreedySolver {
    fn default() -> Self {
        Self {
            max_repair_moves: 50_000,
            descent_moves: 2_000,
        }
    }
}

impl GreedySolver {
    /// Creates a solver with default budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts single-variable equality pins; `None` on contradiction.
    fn pin_scan(model: &ShiftModel) -> Option<Vec<Option<bool>>> {
        let mut pinned: Vec<Option<bool>> = vec![None; model.num_vars()];
        for c in model.constraints() {
            if c.op != CmpOp::Eq || c.expr.terms.len() != 1 {
                continue;
            }
            let (coeff, var) = c.expr.terms[0];
            let needed = c.rhs - c.expr.constant;
            let value = if needed == 0 {
                false
            } else if needed == coeff {
                true
            } else {
                return None;
            };
            match pinned[var] {
                Some(prev) if prev != value => return None,
                _ => pinned[var] = Some(value),
            }
        }
        Some(pinned)
    }

    fn flip_delta(
        constraints: &[HardConstraint],
        touching: &[Vec<usize>],
        works: &mut [bool],
        var: usize,
    ) -> i64 {
        let before: i64 = touching[var]
            .iter()
            .map(|&ci| constraints[ci].violation(works))
            .sum();
        works[var] = !works[var];
        let after: i64 = touching[var]
            .iter()
            .map(|&ci| constraints[ci].violation(works))
            .sum();
        works[var] = !works[var];
        after - before
    }

    /// Min-conflicts repair. Returns whether all hard constraints hold.
    fn repair(
        &self,
        model: &ShiftModel,
        works: &mut [bool],
        pinned: &[Option<bool>],
        touching: &[Vec<usize>],
    ) -> bool {
        let constraints = model.constraints();
        // Short tabu window: long enough to block immediate undo, short
        // enough that small models always keep free candidates.
        let tabu_cap = (model.num_vars() / 2).clamp(2, 8);
        let mut recent: VecDeque<usize> = VecDeque::with_capacity(tabu_cap);
        let mut cursor = 0usize;
        let mut moves = 0usize;

        loop {
            let violated: Vec<usize> = constraints
                .iter()
                .enumerate()
                .filter(|(_, c)| c.violation(works) > 0)
                .map(|(i, _)| i)
                .collect();
            if violated.is_empty() {
                return true;
            }

            let mut progressed = false;
            for ci in violated {
                let c = &constraints[ci];
                let before = c.violation(works);
                if before == 0 {
                    continue;
                }
                if moves >= self.max_repair_moves {
                    return false;
                }

                // Flips that reduce this constraint's own violation.
                let mut candidates = Vec::new();
                for &(_, v) in &c.expr.terms {
                    if pinned[v].is_some() {
                        continue;
                    }
                    works[v] = !works[v];
                    let reduces = c.violation(works) < before;
                    works[v] = !works[v];
                    if reduces {
                        candidates.push(v);
                    }
                }
                if candidates.is_empty() {
                    continue;
                }

                // Prefer a flip that lowers the total violation; fall back
                // to a non-tabu plateau flip so equality rows and the
                // diversity floor can trade cells without cycling.
                let start = cursor % candidates.len();
                let mut improving = None;
                let mut plateau = None;
                for k in 0..candidates.len() {
                    let v = candidates[(start + k) % candidates.len()];
                    let delta = Self::flip_delta(constraints, touching, works, v);
                    if delta < 0 {
                        improving = Some(v);
                        break;
                    }
                    if delta == 0 && plateau.is_none() && !recent.contains(&v) {
                        plateau = Some(v);
                    }
                }
                let Some(v) = improving.or(plateau) else {
                    continue;
                };

                works[v] = !works[v];
                moves += 1;
                cursor += 1;
                recent.push_back(v);
                if recent.len() > tabu_cap {
                    recent.pop_front();
                }
                progressed = true;
            }

            if !progressed {
                return false;
            }
        }
    }

    /// Seeded first-improvement descent on the objective, restricted to
    /// moves that keep every touched constraint satisfied.
    fn descend(
        &self,
        model: &ShiftModel,
        works: &mut [bool],
        pinned: &[Option<bool>],
        touching: &[Vec<usize>],
        params: &SolveParams,
    ) {
        if model.penalties().is_empty() {
            return;
        }
        let constraints = model.constraints();
        let n = model.num_vars();
        let days = model.num_days() as usize;
        let mut rng = SmallRng::seed_from_u64(params.seed);
        let deadline = Instant::now() + params.time_limit;
        let mut best = model.objective_value(works);
        let mut flips: Vec<usize> = Vec::with_capacity(2);

        for iter in 0..self.descent_moves {
            if iter % 256 == 0 && Instant::now() >= deadline {
                break;
            }
            let v1 = rng.random_range(0..n);
            if pinned[v1].is_some() {
                continue;
            }

            flips.clear();
            if rng.random_range(0..4) == 0 {
                // Lone flip: only useful when no equality row binds v1.
                flips.push(v1);
            } else {
                // Quota-preserving swap inside the employee's row.
                let row = v1 / days;
                let v2 = row * days + rng.random_range(0..days);
                if v2 == v1 || pinned[v2].is_some() || works[v1] == works[v2] {
                    continue;
                }
                flips.push(v1);
                flips.push(v2);
            }

            for &v in &flips {
                works[v] = !works[v];
            }
            let feasible = flips
                .iter()
                .flat_map(|&v| touching[v].iter())
                .all(|&ci| constraints[ci].violation(works) == 0);
            if feasible {
                let objective = model.objective_value(works);
                if objective < best {
                    best = objective;
                    continue;
                }
            }
            for &v in &flips {
                works[v] = !works[v];
            }
        }
    }
}

impl SolverBackend for GreedySolver {
    fn solve(&self, model: &ShiftModel, params: &SolveParams) -> SolveOutcome {
        let Some(pinned) = Self::pin_scan(model) else {
            return SolveOutcome::infeasible();
        };

        // A constraint with no free variables is decided already.
        let probe: Vec<bool> = pinned.iter().map(|p| p.unwrap_or(true)).collect();
        for c in model.constraints() {
            if c.expr.terms.iter().all(|&(_, v)| pinned[v].is_some())
                && c.violation(&probe) > 0
            {
                return SolveOutcome::infeasible();
            }
        }

        let mut works = probe;
        let mut touching: Vec<Vec<usize>> = vec![Vec::new(); model.num_vars()];
        for (ci, c) in model.constraints().iter().enumerate() {
            for &(_, v) in &c.expr.terms {
                touching[v].push(ci);
            }
        }

        if !self.repair(model, &mut works, &pinned, &touching) {
            return SolveOutcome::infeasible();
        }
        self.descend(model, &mut works, &pinned, &touching, params);

        let objective = model.objective_value(&works);
        SolveOutcome::solved(SolveStatus::Feasible, works, objective)
    }
}
