//! Soft-rule definitions and shared scheduling arithmetic.
//!
//! Each soft rule is defined exactly once here, as a pair of views over
//! the same formula: [`SoftRule::emit`] produces the linear terms the
//! solver minimizes, [`SoftRule::score`] recomputes the scalar penalty of
//! a concrete assignment. Both read their anchors (targets, averages,
//! group memberships, exemptions) from one [`RuleContext`], so the
//! evaluator total equals the solver objective by construction.
//!
//! All rational targets are rounded half-to-even before use; the model
//! stays integer-linear and re-runs reproduce identical anchors.
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering"

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cp::{AuxDef, CmpOp, LinExpr, PenaltySource, ShiftModel};
use crate::models::{
    ClassifiedRequests, EventLoad, MonthCalendar, Profession, RequestKind, RoleTag,
    Roster, RuleConfiguration, ShiftAssignment, Week,
};

/// Identity of a soft rule, used to tag objective terms and breakdown rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RuleId {
    /// Fewer than two off days in a non-exempt full week.
    FullWeekRest,
    /// No off day in a non-exempt partial week.
    PartialWeekRest,
    /// Sunday PT+OT combined headcount deviation from target.
    SundayTotalTarget,
    /// Sunday PT and OT individual deviation beyond the tolerance band.
    SundaySplitTarget,
    /// Sunday ST headcount deviation from target.
    SundayStTarget,
    /// More than one outpatient-role employee off the same day.
    OutpatientOverlap,
    /// A soft-off request scheduled to work anyway.
    SoftOffRespect,
    /// Missing ward-dedicated PT or OT presence on a non-Sunday day.
    WardPresence,
    /// Daily residual workload deviation from the monthly average.
    UnitBalance,
    /// Daily per-profession headcount deviation from its weekday average.
    HeadcountBalance,
    /// Worked Sundays beyond two, per employee.
    SundayExcess,
}

impl RuleId {
    /// Stable reporting name.
    pub fn name(&self) -> &'static str {
        match self {
            RuleId::FullWeekRest => "full-week-rest",
            RuleId::PartialWeekRest => "partial-week-rest",
            RuleId::SundayTotalTarget => "sunday-total-headcount",
            RuleId::SundaySplitTarget => "sunday-split-headcount",
            RuleId::SundayStTarget => "sunday-st-headcount",
            RuleId::OutpatientOverlap => "outpatient-overlap",
            RuleId::SoftOffRespect => "soft-off-respect",
            RuleId::WardPresence => "ward-presence",
            RuleId::UnitBalance => "unit-balance",
            RuleId::HeadcountBalance => "headcount-balance",
            RuleId::SundayExcess => "sunday-excess",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rounds `num/den` to the nearest integer, ties to even.
///
/// Matches Python's `round`, which the scheduling desk's reference tool
/// used for every target; required for output parity.
pub fn round_half_even(num: i64, den: i64) -> i64 {
    debug_assert!(den > 0);
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    match (2 * r).cmp(&den) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => {
            if q % 2 == 0 {
                q
            } else {
                q + 1
            }
        }
    }
}

/// Precomputed, read-only context shared by the model builder and the
/// penalty evaluator for one scheduling run.
pub struct RuleContext<'a> {
    /// Staff roster.
    pub roster: &'a Roster,
    /// Month calendar.
    pub calendar: &'a MonthCalendar,
    /// Classified leave requests.
    pub requests: &'a ClassifiedRequests,
    /// Rule configuration.
    pub config: &'a RuleConfiguration,
    /// Per-day event workload.
    pub event_load: &'a EventLoad,
    /// Indices of managerial employees.
    pub managers: Vec<usize>,
    /// Indices of PT employees.
    pub pt: Vec<usize>,
    /// Indices of OT employees.
    pub ot: Vec<usize>,
    /// Indices of ST employees.
    pub st: Vec<usize>,
    /// Indices of all ward-dedicated employees.
    pub ward: Vec<usize>,
    /// Indices of ward-dedicated PT employees.
    pub ward_pt: Vec<usize>,
    /// Indices of ward-dedicated OT employees.
    pub ward_ot: Vec<usize>,
    /// Indices of outpatient-role employees.
    pub outpatient: Vec<usize>,
    /// Indices of community-care employees.
    pub community: Vec<usize>,
    /// Per-employee monthly off-day quota.
    pub off_quota: Vec<i64>,
}

impl<'a> RuleContext<'a> {
    /// Derives all group memberships and quotas for one run.
    pub fn new(
        roster: &'a Roster,
        calendar: &'a MonthCalendar,
        requests: &'a ClassifiedRequests,
        config: &'a RuleConfiguration,
        event_load: &'a EventLoad,
    ) -> Self {
        let of_prof =
            |p: Profession| roster.indices_where(|e| e.profession == p);
        let ward = roster.indices_where(|e| e.role == RoleTag::WardDedicated);
        let off_quota = roster
            .employees()
            .iter()
            .map(|e| {
                let full: u32 = requests.count_where(&e.id, |k| k.is_full_day_leave());
                let halves: u32 = requests.count_where(&e.id, |k| k.is_half_leave());
                i64::from(config.base_off_quota + full + halves / 2)
            })
            .collect();

        Self {
            managers: roster.indices_where(|e| e.is_manager),
            pt: of_prof(Profession::Pt),
            ot: of_prof(Profession::Ot),
            st: of_prof(Profession::St),
            ward_pt: ward
                .iter()
                .copied()
                .filter(|&i| roster.get(i).profession == Profession::Pt)
                .collect(),
            ward_ot: ward
                .iter()
                .copied()
                .filter(|&i| roster.get(i).profession == Profession::Ot)
                .collect(),
            ward,
            outpatient: roster.indices_where(|e| e.role == RoleTag::Outpatient),
            community: roster.indices_where(|e| e.role == RoleTag::CommunityCare),
            off_quota,
            roster,
            calendar,
            requests,
            config,
            event_load,
        }
    }

    /// Members of a profession.
    pub fn members(&self, profession: Profession) -> &[usize] {
        match profession {
            Profession::Pt => &self.pt,
            Profession::Ot => &self.ot,
            Profession::St => &self.st,
        }
    }

    /// Expected worked days for an employee: month length minus quota.
    pub fn expected_workdays(&self, employee: usize) -> i64 {
        i64::from(self.calendar.num_days()) - self.off_quota[employee]
    }

    /// Workload units the employee provides on a worked day, halved
    /// (rounded half-to-even) when the day carries a half-day request.
    pub fn unit_contrib(&self, employee: usize, day: u32) -> i64 {
        let units = i64::from(self.roster.get(employee).daily_units);
        if self.requests.is_half_day(&self.roster.get(employee).id, day) {
            round_half_even(units, 2)
        } else {
            units
        }
    }

    /// Whether an employee-week is exempt from the week-rest rules
    /// (three or more requested leave days already fall in that week).
    pub fn exempt_from_week_rest(&self, employee: usize, week: &Week) -> bool {
        self.requests
            .leave_days_in(&self.roster.get(employee).id, &week.days)
            >= 3
    }

    /// Rounded anchor for the daily residual workload: the monthly average
    /// of (expected provided units − event units) over non-Sunday days.
    pub fn residual_anchor(&self) -> i64 {
        let non_sundays = self.calendar.non_sundays().len() as i64;
        let num_days = i64::from(self.calendar.num_days());
        if non_sundays == 0 {
            return 0;
        }
        let expected_units: i64 = self
            .roster
            .employees()
            .iter()
            .enumerate()
            .map(|(i, e)| i64::from(e.daily_units) * self.expected_workdays(i))
            .sum();
        // Exact-rational form of: expected_units · (W/D) − events, over W days.
        let num = expected_units * non_sundays - self.event_load.total() * num_days;
        round_half_even(num, num_days * non_sundays)
    }

    /// Rounded average weekday headcount target for a profession.
    pub fn headcount_target(&self, profession: Profession) -> i64 {
        let non_sundays = self.calendar.non_sundays().len() as i64;
        if non_sundays == 0 {
            return 0;
        }
        let workdays: i64 = self
            .members(profession)
            .iter()
            .map(|&i| self.expected_workdays(i))
            .sum();
        round_half_even(workdays, non_sundays)
    }
}

/// One active soft rule: identity plus its effective weight.
#[derive(Debug, Clone, Copy)]
pub struct SoftRule {
    /// Rule identity.
    pub id: RuleId,
    /// Effective weight (heavy variants already resolved).
    pub weight: i64,
}

/// The active soft rules for a configuration, in reporting order.
///
/// The flattening rules resolve their heavy/standard weight here, so the
/// builder and evaluator can never disagree on the weight in effect.
pub fn soft_rules(config: &RuleConfiguration) -> Vec<SoftRule> {
    let mut rules = Vec::new();
    let mut push = |enabled: bool, id: RuleId, weight: i64| {
        if enabled {
            rules.push(SoftRule { id, weight });
        }
    };

    push(
        config.full_week_rest.enabled,
        RuleId::FullWeekRest,
        config.full_week_rest.weight,
    );
    push(
        config.partial_week_rest.enabled,
        RuleId::PartialWeekRest,
        config.partial_week_rest.weight,
    );
    push(
        config.sunday_total.enabled,
        RuleId::SundayTotalTarget,
        config.sunday_total.weight,
    );
    push(
        config.sunday_split.enabled,
        RuleId::SundaySplitTarget,
        config.sunday_split.weight,
    );
    push(
        config.sunday_st.enabled,
        RuleId::SundayStTarget,
        config.sunday_st.weight,
    );
    push(
        config.outpatient_overlap.enabled,
        RuleId::OutpatientOverlap,
        config.outpatient_overlap.weight,
    );
    push(
        config.soft_off_respect.enabled,
        RuleId::SoftOffRespect,
        config.soft_off_respect.weight,
    );
    push(
        config.ward_presence.enabled,
        RuleId::WardPresence,
        config.ward_presence.weight,
    );
    push(
        config.unit_balance.enabled,
        RuleId::UnitBalance,
        config.unit_balance.effective(config.emphasize_balance),
    );
    push(
        config.headcount_balance.enabled,
        RuleId::HeadcountBalance,
        config.headcount_balance.effective(config.emphasize_balance),
    );
    push(
        config.sunday_excess.enabled,
        RuleId::SundayExcess,
        config.sunday_excess.weight,
    );
    rules
}

impl SoftRule {
    /// Emits this rule's linear objective terms (and, for ward presence,
    /// its hard floor) into the model.
    pub fn emit(&self, ctx: &RuleContext, model: &mut ShiftModel) {
        match self.id {
            RuleId::FullWeekRest => emit_week_rest(ctx, model, self, true, 2),
            RuleId::PartialWeekRest => emit_week_rest(ctx, model, self, false, 1),
            RuleId::SundayTotalTarget => emit_sunday_total(ctx, model, self),
            RuleId::SundaySplitTarget => emit_sunday_split(ctx, model, self),
            RuleId::SundayStTarget => emit_sunday_st(ctx, model, self),
            RuleId::OutpatientOverlap => emit_outpatient_overlap(ctx, model, self),
            RuleId::SoftOffRespect => emit_soft_off(ctx, model, self),
            RuleId::WardPresence => emit_ward_presence(ctx, model, self),
            RuleId::UnitBalance => emit_unit_balance(ctx, model, self),
            RuleId::HeadcountBalance => emit_headcount_balance(ctx, model, self),
            RuleId::SundayExcess => emit_sunday_excess(ctx, model, self),
        }
    }

    /// Recomputes this rule's scalar penalty for a concrete assignment.
    pub fn score(&self, ctx: &RuleContext, assignment: &ShiftAssignment) -> i64 {
        match self.id {
            RuleId::FullWeekRest => score_week_rest(ctx, assignment, self, true, 2),
            RuleId::PartialWeekRest => score_week_rest(ctx, assignment, self, false, 1),
            RuleId::SundayTotalTarget => score_sunday_total(ctx, assignment, self),
            RuleId::SundaySplitTarget => score_sunday_split(ctx, assignment, self),
            RuleId::SundayStTarget => score_sunday_st(ctx, assignment, self),
            RuleId::OutpatientOverlap => score_outpatient_overlap(ctx, assignment, self),
            RuleId::SoftOffRespect => score_soft_off(ctx, assignment, self),
            RuleId::WardPresence => score_ward_presence(ctx, assignment, self),
            RuleId::UnitBalance => score_unit_balance(ctx, assignment, self),
            RuleId::HeadcountBalance => score_headcount_balance(ctx, assignment, self),
            RuleId::SundayExcess => score_sunday_excess(ctx, assignment, self),
        }
    }
}

// Week rest: a violation indicator per non-exempt employee-week with
// fewer off days than the threshold.

fn emit_week_rest(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule, full: bool, threshold: i64) {
    for e in 0..ctx.roster.len() {
        for week in ctx.calendar.weeks() {
            if week.is_full() != full || ctx.exempt_from_week_rest(e, week) {
                continue;
            }
            let mut off = LinExpr::new().offset(week.days.len() as i64);
            for &d in &week.days {
                off = off.term(-1, model.shift_var(e, d));
            }
            let aux = model.add_aux(AuxDef::IsBelow(off, threshold));
            model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
        }
    }
}

fn score_week_rest(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule, full: bool, threshold: i64) -> i64 {
    let mut total = 0;
    for e in 0..ctx.roster.len() {
        for week in ctx.calendar.weeks() {
            if week.is_full() != full || ctx.exempt_from_week_rest(e, week) {
                continue;
            }
            let off = week.days.len() as i64 - i64::from(a.worked_among(e, &week.days));
            if off < threshold {
                total += rule.weight;
            }
        }
    }
    total
}

// Sunday PT+OT combined headcount.

fn emit_sunday_total(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    let target = ctx.config.targets.pt + ctx.config.targets.ot;
    for &d in &ctx.calendar.sundays() {
        let mut expr = LinExpr::new().offset(-target);
        for &e in ctx.pt.iter().chain(&ctx.ot) {
            expr = expr.term(1, model.shift_var(e, d));
        }
        let aux = model.add_aux(AuxDef::Abs(expr));
        model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
    }
}

fn score_sunday_total(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let target = ctx.config.targets.pt + ctx.config.targets.ot;
    ctx.calendar
        .sundays()
        .iter()
        .map(|&d| {
            let on = ctx
                .pt
                .iter()
                .chain(&ctx.ot)
                .filter(|&&e| a.works(e, d))
                .count() as i64;
            rule.weight * (on - target).abs()
        })
        .sum()
}

// Sunday PT and OT individually, with a tolerance band: only the
// deviation beyond the band is penalized.

fn emit_sunday_split(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    let tol = ctx.config.targets.tolerance;
    for &d in &ctx.calendar.sundays() {
        for (members, target) in [(&ctx.pt, ctx.config.targets.pt), (&ctx.ot, ctx.config.targets.ot)] {
            let vars: Vec<_> = members.iter().map(|&e| model.shift_var(e, d)).collect();
            let over = LinExpr::sum(vars.iter().copied()).offset(-target - tol);
            let under = vars
                .iter()
                .fold(LinExpr::new(), |acc, &v| acc.term(-1, v))
                .offset(target - tol);
            let aux = model.add_aux(AuxDef::MaxOf(vec![over, under]));
            model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
        }
    }
}

fn score_sunday_split(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let tol = ctx.config.targets.tolerance;
    let mut total = 0;
    for &d in &ctx.calendar.sundays() {
        for (members, target) in [(&ctx.pt, ctx.config.targets.pt), (&ctx.ot, ctx.config.targets.ot)] {
            let on = members.iter().filter(|&&e| a.works(e, d)).count() as i64;
            total += rule.weight * ((on - target).abs() - tol).max(0);
        }
    }
    total
}

// Sunday ST headcount.

fn emit_sunday_st(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    for &d in &ctx.calendar.sundays() {
        let mut expr = LinExpr::new().offset(-ctx.config.targets.st);
        for &e in &ctx.st {
            expr = expr.term(1, model.shift_var(e, d));
        }
        let aux = model.add_aux(AuxDef::Abs(expr));
        model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
    }
}

fn score_sunday_st(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    ctx.calendar
        .sundays()
        .iter()
        .map(|&d| {
            let on = ctx.st.iter().filter(|&&e| a.works(e, d)).count() as i64;
            rule.weight * (on - ctx.config.targets.st).abs()
        })
        .sum()
}

// At most one outpatient-role employee off per day; every further
// simultaneous absence costs one weight unit.

fn emit_outpatient_overlap(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    if ctx.outpatient.is_empty() {
        return;
    }
    for d in ctx.calendar.days() {
        let mut off = LinExpr::new().offset(ctx.outpatient.len() as i64 - 1);
        for &e in &ctx.outpatient {
            off = off.term(-1, model.shift_var(e, d));
        }
        let aux = model.add_aux(AuxDef::MaxOf(vec![off]));
        model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
    }
}

fn score_outpatient_overlap(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    if ctx.outpatient.is_empty() {
        return 0;
    }
    ctx.calendar
        .days()
        .map(|d| {
            let off = ctx.outpatient.iter().filter(|&&e| !a.works(e, d)).count() as i64;
            rule.weight * (off - 1).max(0)
        })
        .sum()
}

// Soft-off respect: each soft-off cell scheduled to work costs its weight.

fn emit_soft_off(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    for e in 0..ctx.roster.len() {
        for d in ctx.requests.days_of(&ctx.roster.get(e).id, RequestKind::SoftOff) {
            let var = model.shift_var(e, d);
            model.add_penalty(rule.id, rule.weight, PenaltySource::Shift(var));
        }
    }
}

fn score_soft_off(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let mut total = 0;
    for e in 0..ctx.roster.len() {
        for d in ctx.requests.days_of(&ctx.roster.get(e).id, RequestKind::SoftOff) {
            if a.works(e, d) {
                total += rule.weight;
            }
        }
    }
    total
}

// Ward presence: hard floor of one ward-dedicated employee per non-Sunday
// day, plus a penalty for each missing ward PT / ward OT presence.

fn emit_ward_presence(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    for &d in &ctx.calendar.non_sundays() {
        let any = LinExpr::sum(ctx.ward.iter().map(|&e| model.shift_var(e, d)));
        model.add_constraint(format!("ward-presence day {d}"), any, CmpOp::Ge, 1);

        for members in [&ctx.ward_pt, &ctx.ward_ot] {
            let on = LinExpr::sum(members.iter().map(|&e| model.shift_var(e, d)));
            let aux = model.add_aux(AuxDef::IsBelow(on, 1));
            model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
        }
    }
}

fn score_ward_presence(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let mut total = 0;
    for &d in &ctx.calendar.non_sundays() {
        for members in [&ctx.ward_pt, &ctx.ward_ot] {
            if !members.iter().any(|&e| a.works(e, d)) {
                total += rule.weight;
            }
        }
    }
    total
}

// Workload flattening: deviation of each non-Sunday day's residual units
// (provided minus event load) from the rounded monthly average.

fn emit_unit_balance(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    let anchor = ctx.residual_anchor();
    for &d in &ctx.calendar.non_sundays() {
        let mut expr = LinExpr::new().offset(-ctx.event_load.get(d) - anchor);
        for e in 0..ctx.roster.len() {
            let contrib = ctx.unit_contrib(e, d);
            if contrib != 0 {
                expr = expr.term(contrib, model.shift_var(e, d));
            }
        }
        let aux = model.add_aux(AuxDef::Abs(expr));
        model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
    }
}

fn score_unit_balance(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let anchor = ctx.residual_anchor();
    ctx.calendar
        .non_sundays()
        .iter()
        .map(|&d| {
            let provided: i64 = (0..ctx.roster.len())
                .filter(|&e| a.works(e, d))
                .map(|e| ctx.unit_contrib(e, d))
                .sum();
            rule.weight * (provided - ctx.event_load.get(d) - anchor).abs()
        })
        .sum()
}

// Headcount flattening: per profession, deviation of each non-Sunday
// day's headcount from the rounded weekday average.

fn emit_headcount_balance(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    for profession in Profession::ALL {
        let members = ctx.members(profession);
        if members.is_empty() {
            continue;
        }
        let target = ctx.headcount_target(profession);
        for &d in &ctx.calendar.non_sundays() {
            let expr = LinExpr::sum(members.iter().map(|&e| model.shift_var(e, d)))
                .offset(-target);
            let aux = model.add_aux(AuxDef::Abs(expr));
            model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
        }
    }
}

fn score_headcount_balance(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let mut total = 0;
    for profession in Profession::ALL {
        let members = ctx.members(profession);
        if members.is_empty() {
            continue;
        }
        let target = ctx.headcount_target(profession);
        for &d in &ctx.calendar.non_sundays() {
            let on = members.iter().filter(|&&e| a.works(e, d)).count() as i64;
            total += rule.weight * (on - target).abs();
        }
    }
    total
}

// Sunday excess: worked Sundays beyond two, per employee.

fn emit_sunday_excess(ctx: &RuleContext, model: &mut ShiftModel, rule: &SoftRule) {
    let sundays = ctx.calendar.sundays();
    for e in 0..ctx.roster.len() {
        let expr = LinExpr::sum(sundays.iter().map(|&d| model.shift_var(e, d))).offset(-2);
        let aux = model.add_aux(AuxDef::MaxOf(vec![expr]));
        model.add_penalty(rule.id, rule.weight, PenaltySource::Aux(aux));
    }
}

fn score_sunday_excess(ctx: &RuleContext, a: &ShiftAssignment, rule: &SoftRule) -> i64 {
    let sundays = ctx.calendar.sundays();
    (0..ctx.roster.len())
        .map(|e| rule.weight * (i64::from(a.worked_among(e, &sundays)) - 2).max(0))
        .sum()
}
