//! Variable and memory-location identifiers.
//!
//! Both are plain `u32` indices (patricia-tree keys, per spec.md §3) handed
//! out by the frontend's variable/memory-location factories (spec.md §6).
//! The core never allocates them itself.

use super::machine_int::Signedness;
use serde::{Deserialize, Serialize};

pub type VariableId = u32;
pub type MemoryLocationId = u32;
pub type StatementId = u32;
pub type BlockId = u32;

/// What kind of value a variable holds, as reported by the variable
/// factory (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Integer {
        bit_width: u32,
        signedness: Signedness,
    },
    Float {
        bit_width: u32,
    },
    Pointer,
    Aggregate,
}

/// What an abstract memory location represents (spec.md §6 "Memory-location
/// factory").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryLocationKind {
    Global,
    Local,
    /// Dynamic allocation, keyed by the callsite statement and the call
    /// context it was allocated under.
    Dynamic {
        callsite: StatementId,
        call_context: u32,
    },
    Function,
    LibcErrno,
    AbsoluteZero,
}
