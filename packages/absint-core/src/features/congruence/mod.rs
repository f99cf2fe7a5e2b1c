//! Congruences `aZ + b` (spec.md §4.3): tracks alignment/stride facts
//! (`x is even`, `x = 4k+1`) that plain intervals cannot express.

pub mod domain;

pub use domain::congruence::Congruence;
