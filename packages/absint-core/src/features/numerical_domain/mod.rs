//! Non-relational lifting of a per-variable value lattice to a whole
//! abstract store (spec.md §4.7): `VariableId -> V`, missing key means `⊤`.

pub mod domain;

pub use domain::non_relational::NonRelationalDomain;
