//! Month calendar and event-load models.
//!
//! The scheduling horizon is always one calendar month. Days are numbered
//! 1..=N; Sundays are the special staffing day, and the month partitions
//! into weeks that each end on Saturday (so the first and last week of a
//! month are usually partial).

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ScheduleError;

/// One week of the month: consecutive day numbers, ending on a Saturday
/// or on the last day of the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    /// Day numbers in this week, ascending.
    pub days: Vec<u32>,
}

impl Week {
    /// Whether this is a full 7-day week.
    pub fn is_full(&self) -> bool {
        self.days.len() == 7
    }
}

/// A specific calendar month with derived weekday structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthCalendar {
    year: i32,
    month: u32,
    num_days: u32,
    weekdays: Vec<Weekday>,
    weeks: Vec<Week>,
}

impl MonthCalendar {
    /// Builds the calendar for a year/month pair.
    pub fn new(year: i32, month: u32) -> Result<Self, ScheduleError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(ScheduleError::InvalidMonth { year, month })?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(ScheduleError::InvalidMonth { year, month })?;
        let num_days = next_first.signed_duration_since(first).num_days() as u32;

        let mut weekdays = Vec::with_capacity(num_days as usize);
        for day in 1..=num_days {
            // Unwrap-free: every day in 1..=num_days exists by construction.
            let date = first + chrono::Days::new(u64::from(day - 1));
            weekdays.push(date.weekday());
        }

        // Weeks close after Saturday or at month end.
        let mut weeks = Vec::new();
        let mut current = Vec::new();
        for day in 1..=num_days {
            current.push(day);
            if weekdays[(day - 1) as usize] == Weekday::Sat || day == num_days {
                weeks.push(Week {
                    days: std::mem::take(&mut current),
                });
            }
        }

        Ok(Self {
            year,
            month,
            num_days,
            weekdays,
            weeks,
        })
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month (1..=12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in the month.
    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    /// All day numbers, ascending.
    pub fn days(&self) -> impl Iterator<Item = u32> {
        1..=self.num_days
    }

    /// Weekday of a day number (1-based).
    pub fn weekday(&self, day: u32) -> Weekday {
        self.weekdays[(day - 1) as usize]
    }

    /// Whether a day is a Sunday.
    pub fn is_sunday(&self, day: u32) -> bool {
        self.weekday(day) == Weekday::Sun
    }

    /// All Sundays of the month.
    pub fn sundays(&self) -> Vec<u32> {
        self.days().filter(|&d| self.is_sunday(d)).collect()
    }

    /// All non-Sunday days of the month (Saturdays included).
    pub fn non_sundays(&self) -> Vec<u32> {
        self.days().filter(|&d| !self.is_sunday(d)).collect()
    }

    /// Week partition of the month.
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }
}

/// Per-day special workload units consumed by non-staff duties.
///
/// Days without an entry carry zero load. Sundays never carry event load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLoad {
    units: BTreeMap<u32, i64>,
}

impl EventLoad {
    /// Creates an empty (all-zero) event load.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: sets the load for a day.
    pub fn with_units(mut self, day: u32, units: i64) -> Self {
        self.units.insert(day, units);
        self
    }

    /// Load for a day (zero when absent).
    pub fn get(&self, day: u32) -> i64 {
        self.units.get(&day).copied().unwrap_or(0)
    }

    /// Sum of all loads.
    pub fn total(&self) -> i64 {
        self.units.values().sum()
    }

    /// Checks that every entry lies inside the month and that Sundays
    /// carry no load.
    pub fn validate(&self, calendar: &MonthCalendar) -> Result<(), ScheduleError> {
        for (&day, &units) in &self.units {
            if day == 0 || day > calendar.num_days() {
                return Err(ScheduleError::EventDayOutOfRange {
                    day,
                    num_days: calendar.num_days(),
                });
            }
            if units != 0 && calendar.is_sunday(day) {
                return Err(ScheduleError::SundayEventLoad(day));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_length() {
        assert_eq!(MonthCalendar::new(2025, 2).unwrap().num_days(), 28);
        assert_eq!(MonthCalendar::new(2024, 2).unwrap().num_days(), 29);
        assert_eq!(MonthCalendar::new(2025, 6).unwrap().num_days(), 30);
        assert_eq!(MonthCalendar::new(2025, 12).unwrap().num_days(), 31);
    }

    #[test]
    fn test_invalid_month() {
        assert!(matches!(
            MonthCalendar::new(2025, 13),
            Err(ScheduleError::InvalidMonth { .. })
        ));
    }

    #[test]
    fn test_sundays_june_2025() {
        // June 2025 starts on a Sunday.
        let cal = MonthCalendar::new(2025, 6).unwrap();
        assert_eq!(cal.sundays(), vec![1, 8, 15, 22, 29]);
        assert_eq!(cal.non_sundays().len(), 25);
        assert!(cal.is_sunday(8));
        assert!(!cal.is_sunday(9));
    }

    #[test]
    fn test_week_partition() {
        // June 2025: Sun 1 .. Mon 30. Weeks end on Saturdays 7/14/21/28,
        // then a partial 29-30 tail.
        let cal = MonthCalendar::new(2025, 6).unwrap();
        let weeks = cal.weeks();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0].days, (1..=7).collect::<Vec<_>>());
        assert!(weeks[0].is_full());
        assert_eq!(weeks[4].days, vec![29, 30]);
        assert!(!weeks[4].is_full());
    }

    #[test]
    fn test_partial_first_week() {
        // July 2025 starts on a Tuesday: first week is Tue 1 .. Sat 5.
        let cal = MonthCalendar::new(2025, 7).unwrap();
        assert_eq!(cal.weeks()[0].days, vec![1, 2, 3, 4, 5]);
        assert!(!cal.weeks()[0].is_full());
        assert_eq!(cal.weekday(1), Weekday::Tue);
    }

    #[test]
    fn test_event_load_defaults_and_total() {
        let load = EventLoad::new().with_units(3, 40).with_units(10, 20);
        assert_eq!(load.get(3), 40);
        assert_eq!(load.get(4), 0);
        assert_eq!(load.total(), 60);
    }

    #[test]
    fn test_event_load_sunday_rejected() {
        let cal = MonthCalendar::new(2025, 6).unwrap();
        let load = EventLoad::new().with_units(8, 10); // Sunday
        assert!(matches!(
            load.validate(&cal),
            Err(ScheduleError::SundayEventLoad(8))
        ));
        let zero_sunday = EventLoad::new().with_units(8, 0);
        assert!(zero_sunday.validate(&cal).is_ok());
    }

    #[test]
    fn test_event_load_range_checked() {
        let cal = MonthCalendar::new(2025, 6).unwrap();
        let load = EventLoad::new().with_units(31, 5);
        assert!(matches!(
            load.validate(&cal),
            Err(ScheduleError::EventDayOutOfRange { day: 31, .. })
        ));
    }
}
