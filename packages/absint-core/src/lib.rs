//! Abstract-interpretation engine core.
//!
//! Feature-first layout, each module a vertical slice of the pipeline:
//!
//! - `shared`   : the data model (numbers, bounds, machine integers,
//!   persistent patricia maps), the closed IR statement hierarchy, and the
//!   external ports (`ControlFlowGraph`, `VariableFactory`, ...) a frontend
//!   implements to drive the engine.
//! - `config`   : validated analysis tunables.
//! - `features` : value lattices (`interval`, `congruence`,
//!   `interval_congruence`), relational domains (`linear`, `dbm`,
//!   `variable_packing`), the pointer-constraint solver
//!   (`pointer_analysis`), the symbolic transfer function (`transfer`), the
//!   fixpoint driver (`fixpoint`), and the results table (`results`).
//! - `errors`   : the crate's one fatal error type; domain contradictions
//!   are `bottom`, not `Err`.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{AnalyzerError, Result};
pub use shared::lattice::AbstractDomain;
