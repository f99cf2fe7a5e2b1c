//! The reduced product of interval and congruence (spec.md §4.4): tracks
//! both a range and a stride, and narrows each component using the other
//! whenever that narrows the overall set ("reduction").

pub mod domain;

pub use domain::interval_congruence::IntervalCongruence;
