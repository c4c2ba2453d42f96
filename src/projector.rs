//! Schedule projection.
//!
//! Turns a solved assignment plus the classified requests back into the
//! artifacts people actually read: a per-employee status calendar using
//! the desk's display codes, and a per-day aggregate summary (headcounts
//! by profession/role and workload units on non-Sunday days). Half-day
//! statuses weigh 0.5 in every aggregate.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::models::{
    ClassifiedRequests, EventLoad, MonthCalendar, Profession, RequestKind, RoleTag, Roster,
    ShiftAssignment,
};

/// Display status of one employee-day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayStatus {
    /// Off on a forced-off request (`×`).
    ForcedOff,
    /// Off on a soft-off request (`△`).
    SoftOff,
    /// Off on paid leave (`有`).
    PaidLeave,
    /// Off on special leave (`特`).
    SpecialLeave,
    /// Off on seasonal leave (`季`).
    SeasonalLeave,
    /// Scheduled off without a request (`-`).
    Off,
    /// Working on a forced-work request (`○`).
    ForcedWork,
    /// Working despite a soft-off request (`出`).
    SoftOffWorked,
    /// Working with the morning on paid half-leave (`AM有`).
    AmHalfLeave,
    /// Working with the afternoon on paid half-leave (`PM有`).
    PmHalfLeave,
    /// Working with the morning off (`AM休`).
    AmHalfOff,
    /// Working with the afternoon off (`PM休`).
    PmHalfOff,
    /// Plain working day (blank cell).
    Work,
}

impl DayStatus {
    /// The display code used in the rendered table.
    pub fn code(&self) -> &'static str {
        match self {
            DayStatus::ForcedOff => "×",
            DayStatus::SoftOff => "△",
            DayStatus::PaidLeave => "有",
            DayStatus::SpecialLeave => "特",
            DayStatus::SeasonalLeave => "季",
            DayStatus::Off => "-",
            DayStatus::ForcedWork => "○",
            DayStatus::SoftOffWorked => "出",
            DayStatus::AmHalfLeave => "AM有",
            DayStatus::PmHalfLeave => "PM有",
            DayStatus::AmHalfOff => "AM休",
            DayStatus::PmHalfOff => "PM休",
            DayStatus::Work => "",
        }
    }

    /// Whether the cell counts as working.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            DayStatus::ForcedWork
                | DayStatus::SoftOffWorked
                | DayStatus::AmHalfLeave
                | DayStatus::PmHalfLeave
                | DayStatus::AmHalfOff
                | DayStatus::PmHalfOff
                | DayStatus::Work
        )
    }

    /// Attendance weight for headcount/unit aggregation.
    pub fn attendance_weight(&self) -> f64 {
        match self {
            DayStatus::AmHalfLeave
            | DayStatus::PmHalfLeave
            | DayStatus::AmHalfOff
            | DayStatus::PmHalfOff => 0.5,
            s if s.is_working() => 1.0,
            _ => 0.0,
        }
    }

    /// Chooses the status for a cell from the work/off decision and the
    /// request filed there, by display priority.
    pub fn select(works: bool, request: Option<RequestKind>) -> Self {
        if works {
            match request {
                Some(RequestKind::ForcedWork) => DayStatus::ForcedWork,
                Some(RequestKind::SoftOff) => DayStatus::SoftOffWorked,
                Some(RequestKind::AmHalfLeave) => DayStatus::AmHalfLeave,
                Some(RequestKind::PmHalfLeave) => DayStatus::PmHalfLeave,
                Some(RequestKind::AmHalfOff) => DayStatus::AmHalfOff,
                Some(RequestKind::PmHalfOff) => DayStatus::PmHalfOff,
                _ => DayStatus::Work,
            }
        } else {
            match request {
                Some(RequestKind::ForcedOff) => DayStatus::ForcedOff,
                Some(RequestKind::SoftOff) => DayStatus::SoftOff,
                Some(RequestKind::PaidLeave) => DayStatus::PaidLeave,
                Some(RequestKind::SpecialLeave) => DayStatus::SpecialLeave,
                Some(RequestKind::SeasonalLeave) => DayStatus::SeasonalLeave,
                _ => DayStatus::Off,
            }
        }
    }
}

/// Per-employee status calendar for the whole month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCalendar {
    employee_ids: Vec<String>,
    rows: Vec<Vec<DayStatus>>,
}

impl StatusCalendar {
    /// Employee ids, in roster order.
    pub fn employee_ids(&self) -> &[String] {
        &self.employee_ids
    }

    /// Status row of one employee.
    pub fn row(&self, employee: usize) -> &[DayStatus] {
        &self.rows[employee]
    }

    /// Status of one cell (1-based day).
    pub fn status(&self, employee: usize, day: u32) -> DayStatus {
        self.rows[employee][(day - 1) as usize]
    }
}

/// Workload-unit figures for one non-Sunday day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTotals {
    /// PT units provided.
    pub pt: f64,
    /// OT units provided.
    pub ot: f64,
    /// ST units provided.
    pub st: f64,
    /// PT + OT combined.
    pub pt_ot: f64,
    /// The day's event workload.
    pub event: i64,
}

/// Aggregate staffing figures for one day.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    /// Day of month.
    pub day: u32,
    /// Weekday label (desk convention).
    pub weekday: &'static str,
    /// Total attendance (half-day cells weigh 0.5).
    pub total: f64,
    /// PT attendance.
    pub pt: f64,
    /// OT attendance.
    pub ot: f64,
    /// ST attendance.
    pub st: f64,
    /// Managerial attendance.
    pub managers: f64,
    /// Ward-dedicated attendance.
    pub ward: f64,
    /// Outpatient-role attendance.
    pub outpatient: f64,
    /// Community-care attendance.
    pub community: f64,
    /// Unit figures; absent on Sundays.
    pub units: Option<UnitTotals>,
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

/// Projects a solved assignment into the status calendar and the daily
/// summary table.
pub fn project(
    roster: &Roster,
    calendar: &MonthCalendar,
    requests: &ClassifiedRequests,
    event_load: &EventLoad,
    assignment: &ShiftAssignment,
) -> (StatusCalendar, Vec<DailySummary>) {
    let rows: Vec<Vec<DayStatus>> = roster
        .employees()
        .iter()
        .enumerate()
        .map(|(e, emp)| {
            calendar
                .days()
                .map(|d| DayStatus::select(assignment.works(e, d), requests.kind(&emp.id, d)))
                .collect()
        })
        .collect();

    let summary = calendar
        .days()
        .map(|d| {
            let mut s = DailySummary {
                day: d,
                weekday: weekday_label(calendar.weekday(d)),
                total: 0.0,
                pt: 0.0,
                ot: 0.0,
                st: 0.0,
                managers: 0.0,
                ward: 0.0,
                outpatient: 0.0,
                community: 0.0,
                units: None,
            };
            let mut units = UnitTotals {
                pt: 0.0,
                ot: 0.0,
                st: 0.0,
                pt_ot: 0.0,
                event: event_load.get(d),
            };

            for (e, emp) in roster.employees().iter().enumerate() {
                let weight = rows[e][(d - 1) as usize].attendance_weight();
                if weight == 0.0 {
                    continue;
                }
                s.total += weight;
                let provided = weight * f64::from(emp.daily_units);
                match emp.profession {
                    Profession::Pt => {
                        s.pt += weight;
                        units.pt += provided;
                    }
                    Profession::Ot => {
                        s.ot += weight;
                        units.ot += provided;
                    }
                    Profession::St => {
                        s.st += weight;
                        units.st += provided;
                    }
                }
                if emp.is_manager {
                    s.managers += weight;
                }
                match emp.role {
                    RoleTag::WardDedicated => s.ward += weight,
                    RoleTag::Outpatient => s.outpatient += weight,
                    RoleTag::CommunityCare => s.community += weight,
                    RoleTag::None => {}
                }
            }

            if !calendar.is_sunday(d) {
                units.pt_ot = units.pt + units.ot;
                s.units = Some(units);
            }
            s
        })
        .collect();

    (
        StatusCalendar {
            employee_ids: roster.employees().iter().map(|e| e.id.clone()).collect(),
            rows,
        },
        summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Employee;

    #[test]
    fn test_status_selection_off_branch() {
        assert_eq!(
            DayStatus::select(false, Some(RequestKind::ForcedOff)),
            DayStatus::ForcedOff
        );
        assert_eq!(
            DayStatus::select(false, Some(RequestKind::PaidLeave)),
            DayStatus::PaidLeave
        );
        assert_eq!(
            DayStatus::select(false, Some(RequestKind::SeasonalLeave)),
            DayStatus::SeasonalLeave
        );
        assert_eq!(DayStatus::select(false, None), DayStatus::Off);
    }

    #[test]
    fn test_status_selection_work_branch() {
        assert_eq!(
            DayStatus::select(true, Some(RequestKind::ForcedWork)),
            DayStatus::ForcedWork
        );
        assert_eq!(
            DayStatus::select(true, Some(RequestKind::SoftOff)),
            DayStatus::SoftOffWorked
        );
        assert_eq!(
            DayStatus::select(true, Some(RequestKind::AmHalfLeave)),
            DayStatus::AmHalfLeave
        );
        assert_eq!(
            DayStatus::select(true, Some(RequestKind::PmHalfOff)),
            DayStatus::PmHalfOff
        );
        assert_eq!(DayStatus::select(true, None), DayStatus::Work);
    }

    #[test]
    fn test_codes_and_weights() {
        assert_eq!(DayStatus::ForcedOff.code(), "×");
        assert_eq!(DayStatus::SoftOffWorked.code(), "出");
        assert_eq!(DayStatus::Work.code(), "");
        assert_eq!(DayStatus::AmHalfLeave.code(), "AM有");

        assert_eq!(DayStatus::Work.attendance_weight(), 1.0);
        assert_eq!(DayStatus::PmHalfOff.attendance_weight(), 0.5);
        assert_eq!(DayStatus::PaidLeave.attendance_weight(), 0.0);
        assert!(!DayStatus::Off.is_working());
        assert!(DayStatus::SoftOffWorked.is_working());
    }

    fn fixture() -> (Roster, MonthCalendar, ClassifiedRequests, EventLoad) {
        let roster = Roster::new(vec![
            Employee::new("K001", Profession::Pt)
                .with_manager()
                .with_role(RoleTag::WardDedicated)
                .with_daily_units(20),
            Employee::new("K002", Profession::Ot).with_daily_units(18),
            Employee::new("K003", Profession::St)
                .with_role(RoleTag::Outpatient)
                .with_daily_units(16),
        ])
        .unwrap();
        let calendar = MonthCalendar::new(2025, 6).unwrap();
        let mut requests = ClassifiedRequests::new();
        requests.insert("K002", 2, RequestKind::AmHalfLeave);
        requests.insert("K003", 2, RequestKind::ForcedOff);
        (roster, calendar, requests, EventLoad::new().with_units(2, 25))
    }

    #[test]
    fn test_projection_calendar() {
        let (roster, calendar, requests, events) = fixture();
        // Everyone works except K003 on day 2.
        let mut cells = vec![true; 90];
        cells[2 * 30 + 1] = false;
        let assignment = ShiftAssignment::new(3, 30, cells);

        let (statuses, _) = project(&roster, &calendar, &requests, &events, &assignment);
        assert_eq!(statuses.employee_ids(), &["K001", "K002", "K003"]);
        assert_eq!(statuses.status(1, 2), DayStatus::AmHalfLeave);
        assert_eq!(statuses.status(2, 2), DayStatus::ForcedOff);
        assert_eq!(statuses.status(0, 2), DayStatus::Work);
    }

    #[test]
    fn test_summary_half_weights_and_units() {
        let (roster, calendar, requests, events) = fixture();
        let mut cells = vec![true; 90];
        cells[2 * 30 + 1] = false; // K003 off on day 2
        let assignment = ShiftAssignment::new(3, 30, cells);

        let (_, summary) = project(&roster, &calendar, &requests, &events, &assignment);
        // Day 2 (Monday): K001 full, K002 half, K003 off.
        let day2 = &summary[1];
        assert_eq!(day2.weekday, "月");
        assert_eq!(day2.total, 1.5);
        assert_eq!(day2.pt, 1.0);
        assert_eq!(day2.ot, 0.5);
        assert_eq!(day2.st, 0.0);
        assert_eq!(day2.managers, 1.0);
        assert_eq!(day2.ward, 1.0);
        assert_eq!(day2.outpatient, 0.0);

        let units = day2.units.as_ref().unwrap();
        assert_eq!(units.pt, 20.0);
        assert_eq!(units.ot, 9.0); // half of 18
        assert_eq!(units.pt_ot, 29.0);
        assert_eq!(units.event, 25);
    }

    #[test]
    fn test_summary_sunday_has_no_units() {
        let (roster, calendar, requests, events) = fixture();
        let assignment = ShiftAssignment::new(3, 30, vec![true; 90]);
        let (_, summary) = project(&roster, &calendar, &requests, &events, &assignment);

        // June 1st 2025 is a Sunday.
        assert_eq!(summary[0].weekday, "日");
        assert!(summary[0].units.is_none());
        // Headcounts still reported.
        assert_eq!(summary[0].total, 3.0);
    }
}
