//! Linear expressions/constraints over machine variables (spec.md §4.5) and
//! the isolation-based solver that refines a non-relational interval store
//! against a system of them (spec.md §4.6).

pub mod domain;
pub mod infrastructure;

pub use domain::constraint::{LinearConstraint, LinearExpression};
pub use infrastructure::solver::refine_store;
