//! Weak topological ordering and the forward fixpoint driver (spec.md
//! §4.13) that ties the numerical abstract domain to a CFG.

pub mod application;
pub mod domain;

pub use application::iterator::{BlockTransfer, FixpointIterator, FixpointResult};
pub use domain::wto::{Component, Wto};
