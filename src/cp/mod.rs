//! Constraint-model construction.
//!
//! Translates a roster, classified requests, and a rule configuration
//! into a [`ShiftModel`]: one boolean per (employee, day), the toggled
//! hard constraints, and the active soft rules' objective terms. The
//! model is then handed to any [`SolverBackend`](crate::solver::SolverBackend).
//!
//! Every constraint carries a label naming the rule and the employee/day
//! it binds, so an infeasible configuration can be diagnosed from the
//! violated set alone.

mod ir;

pub use ir::{
    AuxDef, AuxId, CmpOp, HardConstraint, LinExpr, PenaltySource, PenaltyTerm, ShiftModel, VarId,
};

use log::debug;

use crate::models::ShiftAssignment;
use crate::rules::{soft_rules, RuleContext};

/// Builds constraint models from a prepared rule context.
pub struct ShiftModelBuilder<'a> {
    ctx: &'a RuleContext<'a>,
}

impl<'a> ShiftModelBuilder<'a> {
    /// Creates a builder over a rule context.
    pub fn new(ctx: &'a RuleContext<'a>) -> Self {
        Self { ctx }
    }

    /// Builds the model for the context's configuration.
    pub fn build(&self) -> ShiftModel {
        let ctx = self.ctx;
        let mut model = ShiftModel::new(ctx.roster.len(), ctx.calendar.num_days());

        self.emit_hard(&mut model);
        for rule in soft_rules(ctx.config) {
            rule.emit(ctx, &mut model);
        }

        debug!(
            "built model: {} vars, {} constraints, {} penalty terms",
            model.num_vars(),
            model.constraint_count(),
            model.penalties().len()
        );
        model
    }

    /// Builds the model plus a diversity floor: the solution must differ
    /// from `reference` in at least `min_distance` cells.
    pub fn build_with_distance(
        &self,
        reference: &ShiftAssignment,
        min_distance: u32,
    ) -> ShiftModel {
        let mut model = self.build();
        let mut distance = LinExpr::new();
        for e in 0..self.ctx.roster.len() {
            for d in self.ctx.calendar.days() {
                let var = model.shift_var(e, d);
                if reference.works(e, d) {
                    // Differs when the new cell is off.
                    distance = distance.term(-1, var).offset(1);
                } else {
                    distance = distance.term(1, var);
                }
            }
        }
        model.add_constraint("diversity", distance, CmpOp::Ge, i64::from(min_distance));
        model
    }

    fn emit_hard(&self, model: &mut ShiftModel) {
        let ctx = self.ctx;
        let hard = &ctx.config.hard;
        let num_days = i64::from(ctx.calendar.num_days());

        if hard.off_quota {
            for e in 0..ctx.roster.len() {
                let worked = LinExpr::sum(ctx.calendar.days().map(|d| model.shift_var(e, d)));
                model.add_constraint(
                    format!("off-quota {}", ctx.roster.get(e).id),
                    worked,
                    CmpOp::Eq,
                    num_days - ctx.off_quota[e],
                );
            }
        }

        if hard.request_pinning {
            for e in 0..ctx.roster.len() {
                let id = &ctx.roster.get(e).id;
                for d in ctx.calendar.days() {
                    let Some(kind) = ctx.requests.kind(id, d) else {
                        continue;
                    };
                    if kind.pins_work() {
                        let expr = LinExpr::new().term(1, model.shift_var(e, d));
                        model.add_constraint(format!("pin-work {id} day {d}"), expr, CmpOp::Eq, 1);
                    } else if kind.pins_off() {
                        let expr = LinExpr::new().term(1, model.shift_var(e, d));
                        model.add_constraint(format!("pin-off {id} day {d}"), expr, CmpOp::Eq, 0);
                    }
                }
            }
        }

        if hard.manager_coverage {
            for d in ctx.calendar.days() {
                let on = LinExpr::sum(ctx.managers.iter().map(|&e| model.shift_var(e, d)));
                model.add_constraint(format!("manager-coverage day {d}"), on, CmpOp::Ge, 1);
            }
        }

        if hard.sunday_role_exclusion {
            for &e in ctx.outpatient.iter().chain(&ctx.community) {
                let id = &ctx.roster.get(e).id;
                for &d in &ctx.calendar.sundays() {
                    let expr = LinExpr::new().term(1, model.shift_var(e, d));
                    model.add_constraint(format!("sunday-off {id} day {d}"), expr, CmpOp::Eq, 0);
                }
            }
        }

        if hard.sunday_cap {
            let sundays = ctx.calendar.sundays();
            for e in 0..ctx.roster.len() {
                let on = LinExpr::sum(sundays.iter().map(|&d| model.shift_var(e, d)));
                model.add_constraint(
                    format!("sunday-cap {}", ctx.roster.get(e).id),
                    on,
                    CmpOp::Le,
                    i64::from(ctx.roster.get(e).sunday_cap),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClassifiedRequests, Employee, EventLoad, MonthCalendar, Profession, RequestKind,
        RoleTag, Roster, RuleConfiguration,
    };

    struct Fixture {
        roster: Roster,
        calendar: MonthCalendar,
        requests: ClassifiedRequests,
        config: RuleConfiguration,
        events: EventLoad,
    }

    fn fixture() -> Fixture {
        let roster = Roster::new(vec![
            Employee::new("K001", Profession::Pt).with_manager().with_daily_units(20),
            Employee::new("K002", Profession::Ot).with_daily_units(18),
            Employee::new("K003", Profession::Pt)
                .with_role(RoleTag::Outpatient)
                .with_daily_units(20),
        ])
        .unwrap();
        let calendar = MonthCalendar::new(2025, 6).unwrap();
        let mut requests = ClassifiedRequests::new();
        requests.insert("K002", 5, RequestKind::ForcedOff);
        requests.insert("K002", 12, RequestKind::ForcedWork);
        Fixture {
            roster,
            calendar,
            requests,
            config: RuleConfiguration::default(),
            events: EventLoad::new(),
        }
    }

    #[test]
    fn test_hard_constraint_inventory() {
        let f = fixture();
        let ctx = RuleContext::new(&f.roster, &f.calendar, &f.requests, &f.config, &f.events);
        let model = ShiftModelBuilder::new(&ctx).build();

        let labels: Vec<_> = model
            .constraints()
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        // 3 quota rows, 2 pins, 30 manager-coverage days, 5 Sunday
        // exclusions for the outpatient PT, 3 Sunday caps, 25 ward floors.
        assert_eq!(labels.iter().filter(|l| l.starts_with("off-quota")).count(), 3);
        assert!(labels.contains(&"pin-off K002 day 5"));
        assert!(labels.contains(&"pin-work K002 day 12"));
        assert_eq!(
            labels.iter().filter(|l| l.starts_with("manager-coverage")).count(),
            30
        );
        assert_eq!(labels.iter().filter(|l| l.starts_with("sunday-off K003")).count(), 5);
        assert_eq!(labels.iter().filter(|l| l.starts_with("sunday-cap")).count(), 3);
        assert_eq!(labels.iter().filter(|l| l.starts_with("ward-presence")).count(), 25);
    }

    #[test]
    fn test_quota_rhs_reflects_leave() {
        let mut f = fixture();
        f.requests.insert("K001", 20, RequestKind::PaidLeave);
        let ctx = RuleContext::new(&f.roster, &f.calendar, &f.requests, &f.config, &f.events);
        let model = ShiftModelBuilder::new(&ctx).build();

        let quota = model
            .constraints()
            .iter()
            .find(|c| c.label == "off-quota K001")
            .unwrap();
        // 30 days − (9 base + 1 paid) = 20 worked days.
        assert_eq!(quota.rhs, 20);
        assert_eq!(quota.op, CmpOp::Eq);
    }

    #[test]
    fn test_toggles_suppress_emission() {
        let mut f = fixture();
        f.config.hard.manager_coverage = false;
        f.config.hard.sunday_role_exclusion = false;
        f.config.ward_presence.enabled = false;
        let ctx = RuleContext::new(&f.roster, &f.calendar, &f.requests, &f.config, &f.events);
        let model = ShiftModelBuilder::new(&ctx).build();

        assert!(!model
            .constraints()
            .iter()
            .any(|c| c.label.starts_with("manager-coverage")
                || c.label.starts_with("sunday-off")
                || c.label.starts_with("ward-presence")));
    }

    #[test]
    fn test_no_soft_rules_no_penalties() {
        let mut f = fixture();
        f.config.full_week_rest.enabled = false;
        f.config.partial_week_rest.enabled = false;
        f.config.sunday_total.enabled = false;
        f.config.sunday_split.enabled = false;
        f.config.sunday_st.enabled = false;
        f.config.outpatient_overlap.enabled = false;
        f.config.soft_off_respect.enabled = false;
        f.config.ward_presence.enabled = false;
        f.config.unit_balance.enabled = false;
        f.config.headcount_balance.enabled = false;
        f.config.sunday_excess.enabled = false;
        let ctx = RuleContext::new(&f.roster, &f.calendar, &f.requests, &f.config, &f.events);
        let model = ShiftModelBuilder::new(&ctx).build();
        assert!(model.penalties().is_empty());
    }

    #[test]
    fn test_distance_floor() {
        let f = fixture();
        let ctx = RuleContext::new(&f.roster, &f.calendar, &f.requests, &f.config, &f.events);
        let builder = ShiftModelBuilder::new(&ctx);

        let reference = crate::models::ShiftAssignment::new(3, 30, vec![true; 90]);
        let model = builder.build_with_distance(&reference, 8);

        let diversity = model
            .constraints()
            .iter()
            .find(|c| c.label == "diversity")
            .unwrap();
        // Identical valuation violates the floor by the full distance.
        assert_eq!(diversity.violation(reference.as_slice()), 8);

        // Flipping 8 cells satisfies it.
        let mut cells = reference.as_slice().to_vec();
        for c in cells.iter_mut().take(8) {
            *c = !*c;
        }
        assert_eq!(diversity.violation(&cells), 0);
    }
}
