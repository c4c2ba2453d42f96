//! Request classification.
//!
//! Turns the raw per-employee, per-day code table into a typed
//! [`ClassifiedRequests`] value. One pass, O(employees × days).
//!
//! Contract:
//! - rows for employee ids absent from the roster are silently skipped;
//! - codes outside the closed set mean "no request";
//! - a day outside the month is a configuration error;
//! - two *different* kinds on the same cell violate category exclusivity
//!   and fail classification (identical duplicates are tolerated).

use log::debug;

use crate::error::ScheduleError;
use crate::models::{ClassifiedRequests, MonthCalendar, RequestKind, Roster};

/// One row of the raw request table: an employee and their day/code entries.
#[derive(Debug, Clone)]
pub struct RequestRow {
    /// Employee id as written in the table.
    pub employee_id: String,
    /// (day-of-month, raw code) pairs.
    pub entries: Vec<(u32, String)>,
}

impl RequestRow {
    /// Creates a row.
    pub fn new(employee_id: impl Into<String>, entries: Vec<(u32, String)>) -> Self {
        Self {
            employee_id: employee_id.into(),
            entries,
        }
    }
}

/// Classifies a raw request table against a roster and month.
pub fn classify(
    rows: &[RequestRow],
    roster: &Roster,
    calendar: &MonthCalendar,
) -> Result<ClassifiedRequests, ScheduleError> {
    let mut requests = ClassifiedRequests::new();

    for row in rows {
        if roster.index_of(&row.employee_id).is_none() {
            debug!("skipping request row for unknown employee '{}'", row.employee_id);
            continue;
        }
        for (day, code) in &row.entries {
            let Some(kind) = RequestKind::from_code(code) else {
                continue;
            };
            if *day == 0 || *day > calendar.num_days() {
                return Err(ScheduleError::DayOutOfRange {
                    employee: row.employee_id.clone(),
                    day: *day,
                    num_days: calendar.num_days(),
                });
            }
            if let Some(prev) = requests.insert(row.employee_id.as_str(), *day, kind) {
                if prev != kind {
                    return Err(ScheduleError::ConflictingRequest {
                        employee: row.employee_id.clone(),
                        day: *day,
                        first: prev,
                        second: kind,
                    });
                }
            }
        }
    }

    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Profession};

    fn roster() -> Roster {
        Roster::new(vec![
            Employee::new("K001", Profession::Pt),
            Employee::new("K002", Profession::Ot),
        ])
        .unwrap()
    }

    fn calendar() -> MonthCalendar {
        MonthCalendar::new(2025, 6).unwrap()
    }

    fn row(id: &str, entries: &[(u32, &str)]) -> RequestRow {
        RequestRow::new(
            id,
            entries.iter().map(|(d, c)| (*d, c.to_string())).collect(),
        )
    }

    #[test]
    fn test_basic_classification() {
        let rows = vec![
            row("K001", &[(3, "×"), (10, "有"), (12, "AM有")]),
            row("K002", &[(3, "△")]),
        ];
        let req = classify(&rows, &roster(), &calendar()).unwrap();
        assert_eq!(req.kind("K001", 3), Some(RequestKind::ForcedOff));
        assert_eq!(req.kind("K001", 10), Some(RequestKind::PaidLeave));
        assert!(req.is_half_day("K001", 12));
        assert_eq!(req.days_of("K002", RequestKind::SoftOff), vec![3]);
    }

    #[test]
    fn test_unknown_employee_skipped() {
        let rows = vec![row("K999", &[(3, "×")]), row("K001", &[(4, "○")])];
        let req = classify(&rows, &roster(), &calendar()).unwrap();
        assert_eq!(req.kind("K999", 3), None);
        assert_eq!(req.kind("K001", 4), Some(RequestKind::ForcedWork));
    }

    #[test]
    fn test_unknown_code_is_none() {
        let rows = vec![row("K001", &[(3, "休"), (4, ""), (5, "×")])];
        let req = classify(&rows, &roster(), &calendar()).unwrap();
        assert_eq!(req.kind("K001", 3), None);
        assert_eq!(req.kind("K001", 4), None);
        assert_eq!(req.kind("K001", 5), Some(RequestKind::ForcedOff));
    }

    #[test]
    fn test_conflicting_kinds_rejected() {
        // Forced-off and forced-work on the same day must fail, not pick one.
        let rows = vec![row("K001", &[(5, "×"), (5, "○")])];
        let err = classify(&rows, &roster(), &calendar()).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::ConflictingRequest { day: 5, .. }
        ));
    }

    #[test]
    fn test_identical_duplicate_tolerated() {
        let rows = vec![row("K001", &[(5, "×")]), row("K001", &[(5, "×")])];
        let req = classify(&rows, &roster(), &calendar()).unwrap();
        assert_eq!(req.kind("K001", 5), Some(RequestKind::ForcedOff));
    }

    #[test]
    fn test_day_out_of_range() {
        let rows = vec![row("K001", &[(31, "×")])]; // June has 30 days
        let err = classify(&rows, &roster(), &calendar()).unwrap_err();
        assert!(matches!(err, ScheduleError::DayOutOfRange { day: 31, .. }));
    }
}
