//! Fixed-width machine-integer intervals (spec.md §4.2): an `Interval<ZNumber>`
//! reinterpreted through a bit-width and signedness, with wraparound
//! handled according to the statement's declared overflow mode.

pub mod domain;

pub use domain::machine_interval::MachineIntInterval;
