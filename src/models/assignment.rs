//! Solved shift assignment.
//!
//! The sole decision-variable set of the whole system: one boolean per
//! (employee, day). Created fresh per solve and immutable afterwards.

use serde::{Deserialize, Serialize};

/// A complete work/off assignment for one month.
///
/// Employees are addressed by roster index, days by 1-based day number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    num_employees: usize,
    num_days: u32,
    works: Vec<bool>,
}

impl ShiftAssignment {
    /// Wraps a flat valuation (employee-major, day-minor order).
    pub fn new(num_employees: usize, num_days: u32, works: Vec<bool>) -> Self {
        debug_assert_eq!(works.len(), num_employees * num_days as usize);
        Self {
            num_employees,
            num_days,
            works,
        }
    }

    /// Number of employees.
    pub fn num_employees(&self) -> usize {
        self.num_employees
    }

    /// Number of days.
    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    fn idx(&self, employee: usize, day: u32) -> usize {
        employee * self.num_days as usize + (day - 1) as usize
    }

    /// Whether an employee works on a day.
    pub fn works(&self, employee: usize, day: u32) -> bool {
        self.works[self.idx(employee, day)]
    }

    /// Number of off days for an employee across the month.
    pub fn off_count(&self, employee: usize) -> u32 {
        (1..=self.num_days)
            .filter(|&d| !self.works(employee, d))
            .count() as u32
    }

    /// Number of worked days among the given days.
    pub fn worked_among(&self, employee: usize, days: &[u32]) -> u32 {
        days.iter().filter(|&&d| self.works(employee, d)).count() as u32
    }

    /// Number of cells on which two assignments differ.
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        debug_assert_eq!(self.works.len(), other.works.len());
        self.works
            .iter()
            .zip(&other.works)
            .filter(|(a, b)| a != b)
            .count() as u32
    }

    /// The flat valuation, employee-major.
    pub fn as_slice(&self) -> &[bool] {
        &self.works
    }
}
