//! Staff roster model.
//!
//! Employees are the entities the roster assigns: therapists of three
//! professions, optionally carrying a managerial flag and a dedicated role.
//! Each employee has a daily workload-unit capacity and a personal cap on
//! Sunday attendance.
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering"

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ScheduleError;

/// Therapist profession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    /// Physical therapist.
    Pt,
    /// Occupational therapist.
    Ot,
    /// Speech therapist.
    St,
}

impl Profession {
    /// All professions, in reporting order.
    pub const ALL: [Profession; 3] = [Profession::Pt, Profession::Ot, Profession::St];

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Profession::Pt => "PT",
            Profession::Ot => "OT",
            Profession::St => "ST",
        }
    }
}

/// Dedicated-role tag.
///
/// Determines role-coverage rules: ward-dedicated staff anchor weekday
/// ward presence, while outpatient and community-care staff are excluded
/// from Sunday work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoleTag {
    /// No dedicated role.
    #[default]
    None,
    /// Dedicated to the recovery ward.
    WardDedicated,
    /// Dedicated to the outpatient clinic.
    Outpatient,
    /// Dedicated to community care.
    CommunityCare,
}

/// A rosterable employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Profession.
    pub profession: Profession,
    /// Whether the employee holds a managerial position.
    pub is_manager: bool,
    /// Dedicated-role tag.
    pub role: RoleTag,
    /// Workload units the employee can provide per full working day.
    pub daily_units: u32,
    /// Personal cap on worked Sundays per month.
    pub sunday_cap: u32,
}

impl Employee {
    /// Creates an employee with default attributes
    /// (not a manager, no role, zero capacity, Sunday cap 2).
    pub fn new(id: impl Into<String>, profession: Profession) -> Self {
        Self {
            id: id.into(),
            profession,
            is_manager: false,
            role: RoleTag::None,
            daily_units: 0,
            sunday_cap: 2,
        }
    }

    /// Marks the employee as a manager.
    pub fn with_manager(mut self) -> Self {
        self.is_manager = true;
        self
    }

    /// Sets the dedicated-role tag.
    pub fn with_role(mut self, role: RoleTag) -> Self {
        self.role = role;
        self
    }

    /// Sets the daily workload-unit capacity.
    pub fn with_daily_units(mut self, units: u32) -> Self {
        self.daily_units = units;
        self
    }

    /// Sets the personal Sunday-work cap.
    pub fn with_sunday_cap(mut self, cap: u32) -> Self {
        self.sunday_cap = cap;
        self
    }
}

/// A validated staff roster.
///
/// Employee order is preserved: all assignment and projection structures
/// index employees by their position in this roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    employees: Vec<Employee>,
}

impl Roster {
    /// Builds a roster, rejecting duplicate employee ids.
    pub fn new(employees: Vec<Employee>) -> Result<Self, ScheduleError> {
        let mut seen = HashSet::new();
        for e in &employees {
            if !seen.insert(e.id.as_str()) {
                return Err(ScheduleError::DuplicateEmployee(e.id.clone()));
            }
        }
        Ok(Self { employees })
    }

    /// All employees, in roster order.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Employee at a roster index.
    pub fn get(&self, index: usize) -> &Employee {
        &self.employees[index]
    }

    /// Roster index for an employee id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.employees.iter().position(|e| e.id == id)
    }

    /// Indices of employees matching a predicate.
    pub fn indices_where(&self, pred: impl Fn(&Employee) -> bool) -> Vec<usize> {
        self.employees
            .iter()
            .enumerate()
            .filter(|(_, e)| pred(e))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_builder() {
        let e = Employee::new("K012", Profession::Pt)
            .with_manager()
            .with_role(RoleTag::WardDedicated)
            .with_daily_units(21)
            .with_sunday_cap(3);

        assert_eq!(e.id, "K012");
        assert_eq!(e.profession, Profession::Pt);
        assert!(e.is_manager);
        assert_eq!(e.role, RoleTag::WardDedicated);
        assert_eq!(e.daily_units, 21);
        assert_eq!(e.sunday_cap, 3);
    }

    #[test]
    fn test_employee_defaults() {
        let e = Employee::new("K001", Profession::St);
        assert!(!e.is_manager);
        assert_eq!(e.role, RoleTag::None);
        assert_eq!(e.daily_units, 0);
        assert_eq!(e.sunday_cap, 2);
    }

    #[test]
    fn test_roster_duplicate_id() {
        let err = Roster::new(vec![
            Employee::new("K001", Profession::Pt),
            Employee::new("K001", Profession::Ot),
        ])
        .unwrap_err();
        assert!(matches!(err, ScheduleError::DuplicateEmployee(id) if id == "K001"));
    }

    #[test]
    fn test_roster_lookup() {
        let roster = Roster::new(vec![
            Employee::new("K001", Profession::Pt),
            Employee::new("K002", Profession::Ot).with_manager(),
            Employee::new("K003", Profession::St),
        ])
        .unwrap();

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.index_of("K002"), Some(1));
        assert_eq!(roster.index_of("K999"), None);
        assert_eq!(roster.indices_where(|e| e.is_manager), vec![1]);
        assert_eq!(
            roster.indices_where(|e| e.profession == Profession::Pt),
            vec![0]
        );
    }
}
