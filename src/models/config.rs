//! Rule configuration.
//!
//! An explicit value object carrying every toggle, weight, and target the
//! model builder and evaluator consume. A build call is fully determined
//! by its arguments; there are no free-floating globals.
//!
//! Defaults mirror the staffing policy the scheduling desk runs with.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Enable flag plus penalty weight for one soft rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SoftWeight {
    /// Whether the rule contributes to the objective.
    pub enabled: bool,
    /// Penalty weight per unit of violation.
    pub weight: i64,
}

impl SoftWeight {
    /// An enabled rule with the given weight.
    pub fn on(weight: i64) -> Self {
        Self {
            enabled: true,
            weight,
        }
    }

    /// Returns a disabled copy.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Weight pair for the flattening rules: a standard weight and a heavier
/// one used by the flattening-emphasized search pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlattenWeight {
    /// Whether the rule contributes to the objective.
    pub enabled: bool,
    /// Standard penalty weight.
    pub weight: i64,
    /// Weight substituted when flattening is emphasized.
    pub heavy_weight: i64,
}

impl FlattenWeight {
    /// An enabled rule with standard and heavy weights.
    pub fn on(weight: i64, heavy_weight: i64) -> Self {
        Self {
            enabled: true,
            weight,
            heavy_weight,
        }
    }

    /// The weight in effect under the given emphasis flag.
    pub fn effective(&self, emphasized: bool) -> i64 {
        if emphasized {
            self.heavy_weight
        } else {
            self.weight
        }
    }
}

/// Enable flags for the hard constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HardToggles {
    /// Exact monthly off-day quota per employee.
    pub off_quota: bool,
    /// Pin forced-work/half-day cells to "works" and leave cells to "off".
    pub request_pinning: bool,
    /// At least one manager works every day.
    pub manager_coverage: bool,
    /// Outpatient and community-care roles never work Sundays.
    pub sunday_role_exclusion: bool,
    /// Personal cap on worked Sundays.
    pub sunday_cap: bool,
}

impl Default for HardToggles {
    fn default() -> Self {
        Self {
            off_quota: true,
            request_pinning: true,
            manager_coverage: true,
            sunday_role_exclusion: true,
            sunday_cap: true,
        }
    }
}

/// Sunday staffing targets and the PT/OT tolerance band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SundayTargets {
    /// Target PT headcount on a Sunday.
    pub pt: i64,
    /// Target OT headcount on a Sunday.
    pub ot: i64,
    /// Target ST headcount on a Sunday.
    pub st: i64,
    /// Per-profession deviation tolerated before the split rule penalizes.
    pub tolerance: i64,
}

impl Default for SundayTargets {
    fn default() -> Self {
        Self {
            pt: 10,
            ot: 5,
            st: 3,
            tolerance: 1,
        }
    }
}

/// Complete rule configuration for one scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfiguration {
    /// Hard-constraint toggles.
    pub hard: HardToggles,
    /// Fewer than 2 off days in a non-exempt full week.
    pub full_week_rest: SoftWeight,
    /// No off day in a non-exempt partial week.
    pub partial_week_rest: SoftWeight,
    /// Sunday PT+OT combined headcount deviation.
    pub sunday_total: SoftWeight,
    /// Sunday PT and OT individual deviations beyond the tolerance band.
    pub sunday_split: SoftWeight,
    /// Sunday ST headcount deviation.
    pub sunday_st: SoftWeight,
    /// More than one outpatient-role employee off the same day.
    pub outpatient_overlap: SoftWeight,
    /// A soft-off request scheduled to work anyway.
    pub soft_off_respect: SoftWeight,
    /// Missing ward-dedicated PT/OT presence on a non-Sunday day.
    pub ward_presence: SoftWeight,
    /// Daily residual workload deviation from the monthly average.
    pub unit_balance: FlattenWeight,
    /// Daily per-profession headcount deviation from its weekday average.
    pub headcount_balance: FlattenWeight,
    /// Worked Sundays beyond two, per employee.
    pub sunday_excess: SoftWeight,
    /// Sunday staffing targets.
    pub targets: SundayTargets,
    /// Base off-day quota before leave credits.
    pub base_off_quota: u32,
    /// Use the heavy flattening weights.
    pub emphasize_balance: bool,
    /// Minimum Hamming distance required of the alternative pattern.
    pub min_diversity: u32,
    /// Wall-clock budget per solve attempt.
    pub time_limit: Duration,
}

impl Default for RuleConfiguration {
    fn default() -> Self {
        Self {
            hard: HardToggles::default(),
            full_week_rest: SoftWeight::on(200),
            partial_week_rest: SoftWeight::on(25),
            sunday_total: SoftWeight::on(50),
            sunday_split: SoftWeight::on(40),
            sunday_st: SoftWeight::on(60),
            outpatient_overlap: SoftWeight::on(10),
            soft_off_respect: SoftWeight::on(8),
            ward_presence: SoftWeight::on(5),
            unit_balance: FlattenWeight::on(2, 4),
            headcount_balance: FlattenWeight::on(1, 3),
            sunday_excess: SoftWeight::on(15),
            targets: SundayTargets::default(),
            base_off_quota: 9,
            emphasize_balance: false,
            min_diversity: 10,
            time_limit: Duration::from_secs(20),
        }
    }
}

impl RuleConfiguration {
    /// A copy with the heavy flattening weights in effect (pattern 3).
    pub fn emphasized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.emphasize_balance = true;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let cfg = RuleConfiguration::default();
        assert_eq!(cfg.full_week_rest.weight, 200);
        assert_eq!(cfg.partial_week_rest.weight, 25);
        assert_eq!(cfg.sunday_total.weight, 50);
        assert_eq!(cfg.sunday_split.weight, 40);
        assert_eq!(cfg.sunday_st.weight, 60);
        assert_eq!(cfg.outpatient_overlap.weight, 10);
        assert_eq!(cfg.soft_off_respect.weight, 8);
        assert_eq!(cfg.ward_presence.weight, 5);
        assert_eq!(cfg.unit_balance.weight, 2);
        assert_eq!(cfg.unit_balance.heavy_weight, 4);
        assert_eq!(cfg.headcount_balance.weight, 1);
        assert_eq!(cfg.headcount_balance.heavy_weight, 3);
        assert_eq!(cfg.base_off_quota, 9);
        assert_eq!(cfg.targets.pt, 10);
        assert_eq!(cfg.targets.tolerance, 1);
        assert!(!cfg.emphasize_balance);
    }

    #[test]
    fn test_effective_weight() {
        let fw = FlattenWeight::on(2, 4);
        assert_eq!(fw.effective(false), 2);
        assert_eq!(fw.effective(true), 4);
    }

    #[test]
    fn test_emphasized_copy() {
        let cfg = RuleConfiguration::default();
        let heavy = cfg.emphasized();
        assert!(heavy.emphasize_balance);
        assert!(!cfg.emphasize_balance);
        assert_eq!(heavy.unit_balance.heavy_weight, 4);
    }

    #[test]
    fn test_serde_round_trip() {
        let cfg = RuleConfiguration::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RuleConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back.full_week_rest.weight, cfg.full_week_rest.weight);
        assert_eq!(back.time_limit, cfg.time_limit);
        assert_eq!(back.min_diversity, cfg.min_diversity);
    }
}
