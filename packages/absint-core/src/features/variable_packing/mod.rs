//! Variable-packing meta-domain (spec.md §4.10): a union-find of variable
//! equivalence classes, each holding one `Dbm` over exactly that class's
//! variables, so relational precision costs scale with the largest class
//! rather than the whole program's variable universe.

pub mod domain;
pub mod infrastructure;

pub use domain::packing::VariablePacking;
