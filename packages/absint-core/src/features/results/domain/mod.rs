pub mod check_result;
pub mod program_point;
pub mod results_table;

pub use check_result::{CheckResult, CheckStatus};
pub use program_point::ProgramPoint;
pub use results_table::ResultsTable;
