//! Pointer-constraint generation and solving (spec.md §4.11): a
//! flow-insensitive, Andersen-style inclusion solver over the four
//! constraint shapes `p = &a @ I`, `p = q @ I`, `*p = q @ I`, `p = *q @ I`.
//! Computed independently of (and ahead of) the numerical fixpoint; its
//! output feeds back in as indirect-call resolution and offset
//! refinement (spec.md §4.12).

pub mod domain;
pub mod infrastructure;

pub use domain::constraint::PointerConstraint;
pub use domain::pointer_info::{PointerFact, PointerInfo, PointsToSet};
pub use infrastructure::generator::ConstraintGenerator;
pub use infrastructure::solver::PointerSolver;
