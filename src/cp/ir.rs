//! Solver-facing model representation.
//!
//! A [`ShiftModel`] is what the model builder hands to a
//! [`SolverBackend`](crate::solver::SolverBackend): boolean shift
//! variables addressed by (employee, day), linear hard constraints over
//! those variables, auxiliary integer variables with a defining form, and
//! a minimize objective of weighted terms tagged by rule.
//!
//! Auxiliary variables carry their own semantics so any backend can value
//! them from a boolean assignment under minimization:
//! - `Abs(e)`      — the absolute value of a linear expression;
//! - `MaxOf(es)`   — the largest expression value, floored at zero (the
//!   lower-bound pattern used for tolerance bands and overflow counts);
//! - `IsBelow(e, t)` — 1 exactly when the expression is below a threshold
//!   (the reified/only-if pattern used for week-rest and presence rules).
//!
//! The model can evaluate any assignment's objective and per-rule totals
//! itself; tests use this to hold backends to the reporting contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rules::RuleId;

/// Index of a boolean shift variable.
pub type VarId = usize;

/// Index of an auxiliary integer variable.
pub type AuxId = usize;

/// A linear expression `Σ coeff·x + constant` over shift variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinExpr {
    /// (coefficient, variable) terms.
    pub terms: Vec<(i64, VarId)>,
    /// Constant offset.
    pub constant: i64,
}

impl LinExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a term.
    pub fn term(mut self, coeff: i64, var: VarId) -> Self {
        self.terms.push((coeff, var));
        self
    }

    /// Builder: adds to the constant offset.
    pub fn offset(mut self, constant: i64) -> Self {
        self.constant += constant;
        self
    }

    /// Sum of variables with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (1, v)).collect(),
            constant: 0,
        }
    }

    /// Evaluates the expression over a boolean valuation.
    pub fn value(&self, works: &[bool]) -> i64 {
        let vars: i64 = self
            .terms
            .iter()
            .map(|(c, v)| if works[*v] { *c } else { 0 })
            .sum();
        vars + self.constant
    }
}

/// Comparison operator of a hard constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Left side must equal the bound.
    Eq,
    /// Left side must not exceed the bound.
    Le,
    /// Left side must reach the bound.
    Ge,
}

/// A linear hard constraint with a diagnostic label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardConstraint {
    /// Rule and entity for infeasibility diagnosis.
    pub label: String,
    /// Left side.
    pub expr: LinExpr,
    /// Comparison.
    pub op: CmpOp,
    /// Right side.
    pub rhs: i64,
}

impl HardConstraint {
    /// Violation magnitude of a valuation (zero when satisfied).
    pub fn violation(&self, works: &[bool]) -> i64 {
        let lhs = self.expr.value(works);
        match self.op {
            CmpOp::Eq => (lhs - self.rhs).abs(),
            CmpOp::Le => (lhs - self.rhs).max(0),
            CmpOp::Ge => (self.rhs - lhs).max(0),
        }
    }
}

/// Defining form of an auxiliary integer variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuxDef {
    /// `aux == |expr|`.
    Abs(LinExpr),
    /// `aux == max(0, expr₁, expr₂, …)` under minimization.
    MaxOf(Vec<LinExpr>),
    /// `aux == 1` iff `expr < threshold`, else 0.
    IsBelow(LinExpr, i64),
}

impl AuxDef {
    /// Values the auxiliary variable from a boolean valuation.
    pub fn value(&self, works: &[bool]) -> i64 {
        match self {
            AuxDef::Abs(expr) => expr.value(works).abs(),
            AuxDef::MaxOf(exprs) => exprs.iter().map(|e| e.value(works)).max().unwrap_or(0).max(0),
            AuxDef::IsBelow(expr, threshold) => i64::from(expr.value(works) < *threshold),
        }
    }
}

/// What a penalty term multiplies its weight by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PenaltySource {
    /// A shift variable (0/1).
    Shift(VarId),
    /// An auxiliary variable.
    Aux(AuxId),
}

/// One weighted term of the minimize objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyTerm {
    /// Rule this term belongs to.
    pub rule: RuleId,
    /// Penalty weight.
    pub weight: i64,
    /// Variable being weighted.
    pub source: PenaltySource,
}

/// A complete constraint-optimization model for one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftModel {
    num_employees: usize,
    num_days: u32,
    constraints: Vec<HardConstraint>,
    aux: Vec<AuxDef>,
    penalties: Vec<PenaltyTerm>,
}

impl ShiftModel {
    /// Creates a model with one boolean per (employee, day) and nothing else.
    pub fn new(num_employees: usize, num_days: u32) -> Self {
        Self {
            num_employees,
            num_days,
            constraints: Vec::new(),
            aux: Vec::new(),
            penalties: Vec::new(),
        }
    }

    /// Number of boolean shift variables.
    pub fn num_vars(&self) -> usize {
        self.num_employees * self.num_days as usize
    }

    /// Number of employees.
    pub fn num_employees(&self) -> usize {
        self.num_employees
    }

    /// Number of days.
    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    /// The shift variable for (employee index, 1-based day).
    pub fn shift_var(&self, employee: usize, day: u32) -> VarId {
        debug_assert!(employee < self.num_employees && day >= 1 && day <= self.num_days);
        employee * self.num_days as usize + (day - 1) as usize
    }

    /// Adds a hard constraint.
    pub fn add_constraint(
        &mut self,
        label: impl Into<String>,
        expr: LinExpr,
        op: CmpOp,
        rhs: i64,
    ) {
        self.constraints.push(HardConstraint {
            label: label.into(),
            expr,
            op,
            rhs,
        });
    }

    /// Adds an auxiliary variable, returning its id.
    pub fn add_aux(&mut self, def: AuxDef) -> AuxId {
        self.aux.push(def);
        self.aux.len() - 1
    }

    /// Adds an objective term.
    pub fn add_penalty(&mut self, rule: RuleId, weight: i64, source: PenaltySource) {
        self.penalties.push(PenaltyTerm {
            rule,
            weight,
            source,
        });
    }

    /// Hard constraints.
    pub fn constraints(&self) -> &[HardConstraint] {
        &self.constraints
    }

    /// Objective terms.
    pub fn penalties(&self) -> &[PenaltyTerm] {
        &self.penalties
    }

    /// Number of hard constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Sum of hard-constraint violations for a valuation.
    pub fn total_violation(&self, works: &[bool]) -> i64 {
        self.constraints.iter().map(|c| c.violation(works)).sum()
    }

    /// Labels of violated hard constraints, for diagnosis.
    pub fn violated_labels(&self, works: &[bool]) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| c.violation(works) > 0)
            .map(|c| c.label.as_str())
            .collect()
    }

    fn source_value(&self, source: PenaltySource, works: &[bool]) -> i64 {
        match source {
            PenaltySource::Shift(v) => i64::from(works[v]),
            PenaltySource::Aux(a) => self.aux[a].value(works),
        }
    }

    /// Objective value of a valuation (auxiliaries derived from their
    /// definitions, as any conforming backend would under minimization).
    pub fn objective_value(&self, works: &[bool]) -> i64 {
        self.penalties
            .iter()
            .map(|t| t.weight * self.source_value(t.source, works))
            .sum()
    }

    /// Objective value grouped by rule.
    pub fn penalty_by_rule(&self, works: &[bool]) -> BTreeMap<RuleId, i64> {
        let mut map = BTreeMap::new();
        for t in &self.penalties {
            *map.entry(t.rule).or_insert(0) += t.weight * self.source_value(t.source, works);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_value() {
        let e = LinExpr::new().term(2, 0).term(-1, 1).offset(3);
        assert_eq!(e.value(&[true, true]), 4);
        assert_eq!(e.value(&[false, true]), 2);
        assert_eq!(e.value(&[false, false]), 3);
    }

    #[test]
    fn test_sum_builder() {
        let e = LinExpr::sum([0, 2]);
        assert_eq!(e.value(&[true, true, true]), 2);
        assert_eq!(e.value(&[true, true, false]), 1);
    }

    #[test]
    fn test_constraint_violation() {
        let c = HardConstraint {
            label: "test".into(),
            expr: LinExpr::sum([0, 1, 2]),
            op: CmpOp::Ge,
            rhs: 2,
        };
        assert_eq!(c.violation(&[true, true, false]), 0);
        assert_eq!(c.violation(&[true, false, false]), 1);
        assert_eq!(c.violation(&[false, false, false]), 2);

        let eq = HardConstraint {
            label: "eq".into(),
            expr: LinExpr::sum([0, 1]),
            op: CmpOp::Eq,
            rhs: 1,
        };
        assert_eq!(eq.violation(&[true, true]), 1);
        assert_eq!(eq.violation(&[false, true]), 0);
    }

    #[test]
    fn test_aux_values() {
        let abs = AuxDef::Abs(LinExpr::sum([0, 1]).offset(-1));
        assert_eq!(abs.value(&[false, false]), 1);
        assert_eq!(abs.value(&[true, true]), 1);
        assert_eq!(abs.value(&[true, false]), 0);

        let max = AuxDef::MaxOf(vec![
            LinExpr::sum([0]).offset(-2),
            LinExpr::new().term(-1, 0).offset(-2),
        ]);
        assert_eq!(max.value(&[true]), 0); // max(0, -1, -3)
        assert_eq!(max.value(&[false]), 0); // max(0, -2, -2)

        let below = AuxDef::IsBelow(LinExpr::sum([0, 1]), 2);
        assert_eq!(below.value(&[true, false]), 1);
        assert_eq!(below.value(&[true, true]), 0);
    }

    #[test]
    fn test_objective_and_breakdown() {
        let mut m = ShiftModel::new(1, 3);
        let v0 = m.shift_var(0, 1);
        let a = m.add_aux(AuxDef::Abs(LinExpr::sum([m.shift_var(0, 2)]).offset(-1)));
        m.add_penalty(RuleId::SoftOffRespect, 8, PenaltySource::Shift(v0));
        m.add_penalty(RuleId::SundayStTarget, 60, PenaltySource::Aux(a));

        // v0 works, day 2 off → |0 - 1| = 1.
        let works = [true, false, false];
        assert_eq!(m.objective_value(&works), 8 + 60);
        let by_rule = m.penalty_by_rule(&works);
        assert_eq!(by_rule[&RuleId::SoftOffRespect], 8);
        assert_eq!(by_rule[&RuleId::SundayStTarget], 60);
    }

    #[test]
    fn test_shift_var_layout() {
        let m = ShiftModel::new(3, 30);
        assert_eq!(m.shift_var(0, 1), 0);
        assert_eq!(m.shift_var(0, 30), 29);
        assert_eq!(m.shift_var(1, 1), 30);
        assert_eq!(m.shift_var(2, 15), 74);
        assert_eq!(m.num_vars(), 90);
    }
}
