//! Monthly shift rostering for a clinical rehabilitation department.
//!
//! Builds a constraint-optimization model from a staff roster, per-day
//! leave requests, and a staffing-policy configuration; drives a generic
//! solver backend through up to three complementary search patterns; and
//! projects the solved work/off assignment back into a human-readable
//! status calendar, a daily staffing summary, and an auditable
//! rule-by-rule penalty breakdown.
//!
//! # Modules
//!
//! - **`models`**: domain types — `Employee`, `Roster`, `MonthCalendar`,
//!   `ClassifiedRequests`, `RuleConfiguration`, `ShiftAssignment`
//! - **`classifier`**: raw request-table codes → typed request sets
//! - **`rules`**: the soft-rule table; each rule defined once, emitting
//!   both its linear model terms and its scalar re-scoring
//! - **`cp`**: the constraint model and its builder
//! - **`solver`**: the backend abstraction plus a deterministic baseline
//! - **`evaluator`**: independent penalty re-scoring and verification
//! - **`search`**: the three-pattern orchestrator
//! - **`projector`**: status calendar and daily summary reconstruction
//!
//! # Pipeline
//!
//! ```text
//! tables ─→ classifier ─→ rules::RuleContext ─→ cp::ShiftModelBuilder
//!        ─→ solver ─→ evaluator + projector ─→ search::SearchOutcome
//! ```
//!
//! Input parsing, form handling, and spreadsheet export live outside this
//! crate; it consumes and produces plain data structures.

pub mod classifier;
pub mod cp;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod projector;
pub mod rules;
pub mod search;
pub mod solver;

pub use error::ScheduleError;
