//! APRON-style façade (spec.md §4.9): a uniform binary-operation surface
//! meant to dispatch to whichever native relational backend (octagons,
//! convex polyhedra, linear equalities, congruences, or their reduced
//! product) the caller asked for.
//!
//! Per §9 "APRON bridge": APRON itself is an external native C library.
//! This build does not vendor a binding to it, so with the `apron`
//! Cargo feature off the adapter silently degrades to the native `Dbm`
//! backend already implemented in this crate (sound, just coarser than
//! real octagons/polyhedra on some benchmarks). With `apron` on, a
//! caller is explicitly asking for a precision this build can't deliver,
//! so construction fails loudly instead of quietly returning the
//! degraded backend.

pub mod infrastructure;

pub use infrastructure::adapter::{ApronAdapter, ApronDomainKind};
