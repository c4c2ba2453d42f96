//! Rostering domain models.
//!
//! Core value types for representing one monthly scheduling problem and
//! its solution: the staff roster, the month calendar and event load,
//! classified leave requests, the rule configuration, and the solved
//! work/off assignment.

mod assignment;
mod calendar;
mod config;
mod requests;
mod staff;

pub use assignment::ShiftAssignment;
pub use calendar::{EventLoad, MonthCalendar, Week};
pub use config::{FlattenWeight, HardToggles, RuleConfiguration, SoftWeight, SundayTargets};
pub use requests::{ClassifiedRequests, RequestKind};
pub use staff::{Employee, Profession, RoleTag, Roster};
