//! Leave-request model.
//!
//! Requests arrive as per-day codes in the upload tables; the classifier
//! turns them into a [`ClassifiedRequests`] value that every downstream
//! component receives explicitly. A cell carries at most one kind; the
//! absence of an entry means no request.
//!
//! Half-day kinds count as half an attendance for headcount and workload
//! accounting but still pin the work/off decision to "works". Full-day
//! leave kinds pin it to "off".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of request categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Hard request for a day off (`×`).
    ForcedOff,
    /// Soft request for a day off (`△`); may be overridden at a penalty.
    SoftOff,
    /// Hard request to work (`○`).
    ForcedWork,
    /// Paid leave (`有`).
    PaidLeave,
    /// Special leave (`特`).
    SpecialLeave,
    /// Seasonal leave (`季`).
    SeasonalLeave,
    /// Paid leave for the morning half (`AM有`).
    AmHalfLeave,
    /// Paid leave for the afternoon half (`PM有`).
    PmHalfLeave,
    /// Morning half off (`AM休`).
    AmHalfOff,
    /// Afternoon half off (`PM休`).
    PmHalfOff,
}

impl RequestKind {
    /// Parses one of the upload-table codes. Anything else is "no request".
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "×" => Some(RequestKind::ForcedOff),
            "△" => Some(RequestKind::SoftOff),
            "○" => Some(RequestKind::ForcedWork),
            "有" => Some(RequestKind::PaidLeave),
            "特" => Some(RequestKind::SpecialLeave),
            "季" => Some(RequestKind::SeasonalLeave),
            "AM有" => Some(RequestKind::AmHalfLeave),
            "PM有" => Some(RequestKind::PmHalfLeave),
            "AM休" => Some(RequestKind::AmHalfOff),
            "PM休" => Some(RequestKind::PmHalfOff),
            _ => None,
        }
    }

    /// The upload-table code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            RequestKind::ForcedOff => "×",
            RequestKind::SoftOff => "△",
            RequestKind::ForcedWork => "○",
            RequestKind::PaidLeave => "有",
            RequestKind::SpecialLeave => "特",
            RequestKind::SeasonalLeave => "季",
            RequestKind::AmHalfLeave => "AM有",
            RequestKind::PmHalfLeave => "PM有",
            RequestKind::AmHalfOff => "AM休",
            RequestKind::PmHalfOff => "PM休",
        }
    }

    /// Full-day leave: paid, special, or seasonal.
    pub fn is_full_day_leave(&self) -> bool {
        matches!(
            self,
            RequestKind::PaidLeave | RequestKind::SpecialLeave | RequestKind::SeasonalLeave
        )
    }

    /// Any half-day kind (counts 0.5 for attendance accounting).
    pub fn is_half_day(&self) -> bool {
        matches!(
            self,
            RequestKind::AmHalfLeave
                | RequestKind::PmHalfLeave
                | RequestKind::AmHalfOff
                | RequestKind::PmHalfOff
        )
    }

    /// Half-day *leave* (contributes to the off-day quota).
    pub fn is_half_leave(&self) -> bool {
        matches!(self, RequestKind::AmHalfLeave | RequestKind::PmHalfLeave)
    }

    /// Whether this kind pins the decision to "off".
    pub fn pins_off(&self) -> bool {
        *self == RequestKind::ForcedOff || self.is_full_day_leave()
    }

    /// Whether this kind pins the decision to "works".
    pub fn pins_work(&self) -> bool {
        *self == RequestKind::ForcedWork || self.is_half_day()
    }

    /// Whether this kind counts as a requested leave day for the
    /// week-rest exemption.
    pub fn is_leave_request(&self) -> bool {
        matches!(self, RequestKind::ForcedOff | RequestKind::SoftOff) || self.is_full_day_leave()
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// All classified requests for one month, employee → day → kind.
///
/// Built by the classifier and passed by reference into the model builder,
/// the evaluator, and the projector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifiedRequests {
    entries: BTreeMap<String, BTreeMap<u32, RequestKind>>,
}

impl ClassifiedRequests {
    /// Creates an empty request set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request, returning the previous kind for that cell if any.
    pub fn insert(&mut self, employee: impl Into<String>, day: u32, kind: RequestKind) -> Option<RequestKind> {
        self.entries.entry(employee.into()).or_default().insert(day, kind)
    }

    /// The request kind on a cell, if any.
    pub fn kind(&self, employee: &str, day: u32) -> Option<RequestKind> {
        self.entries.get(employee).and_then(|m| m.get(&day)).copied()
    }

    /// Ordered days on which an employee filed a given kind.
    pub fn days_of(&self, employee: &str, kind: RequestKind) -> Vec<u32> {
        self.entries
            .get(employee)
            .map(|m| {
                m.iter()
                    .filter(|(_, k)| **k == kind)
                    .map(|(d, _)| *d)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of days matching a predicate for an employee.
    pub fn count_where(&self, employee: &str, pred: impl Fn(RequestKind) -> bool) -> u32 {
        self.entries
            .get(employee)
            .map(|m| m.values().filter(|k| pred(**k)).count() as u32)
            .unwrap_or(0)
    }

    /// Whether the cell carries any half-day kind.
    pub fn is_half_day(&self, employee: &str, day: u32) -> bool {
        self.kind(employee, day).is_some_and(|k| k.is_half_day())
    }

    /// Requested leave days (for the week-rest exemption) among `days`.
    pub fn leave_days_in(&self, employee: &str, days: &[u32]) -> usize {
        days.iter()
            .filter(|d| self.kind(employee, **d).is_some_and(|k| k.is_leave_request()))
            .count()
    }
}
