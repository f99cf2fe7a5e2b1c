//! The results table (spec.md §4.14) and the check-result record the
//! external results database (§6) is keyed by. The core owns only the
//! in-memory mapping and a read-only iterator over it; persistence is
//! `absint-results-db`'s concern entirely.

pub mod application;
pub mod domain;

pub use application::collector::ProgramPointCollector;
pub use domain::check_result::{CheckResult, CheckStatus};
pub use domain::program_point::ProgramPoint;
pub use domain::results_table::ResultsTable;
