//! Integer and rational intervals (spec.md §4.1): the base numerical
//! abstraction every relational and non-relational domain above it reduces
//! to at some point.

pub mod domain;

pub use domain::interval::Interval;
