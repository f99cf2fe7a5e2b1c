//! Cross-cutting types shared by every feature: the data model (numbers,
//! bounds, machine integers, variable/location ids), the persistent
//! patricia-tree substrate, the closed IR statement hierarchy, and the
//! external-interface ports the core consumes.

pub mod ir;
pub mod lattice;
pub mod models;
pub mod patricia;
pub mod ports;
