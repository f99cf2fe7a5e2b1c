//! The four pointer-constraint shapes (spec.md §4.11), adapted from this
//! codebase's Andersen-style `ConstraintKind` (alloc/copy/load/store) to
//! carry an explicit offset interval per constraint rather than an
//! optional field index, since this engine is not field-sensitive.

use crate::features::interval::domain::interval::Interval;
use crate::shared::models::{MemoryLocationId, VariableId, ZNumber};

#[derive(Debug, Clone, PartialEq)]
pub enum PointerConstraint {
    /// `p = &a @ I`
    AddressOf { p: VariableId, location: MemoryLocationId, offset: Interval<ZNumber> },
    /// `p = q @ I`
    Copy { p: VariableId, q: VariableId, offset: Interval<ZNumber> },
    /// `*p = q @ I`
    Store { p: VariableId, q: VariableId, offset: Interval<ZNumber> },
    /// `p = *q @ I`
    Load { p: VariableId, q: VariableId, offset: Interval<ZNumber> },
}

impl PointerConstraint {
    pub fn address_of(p: VariableId, location: MemoryLocationId) -> Self {
        Self::AddressOf { p, location, offset: Interval::singleton(ZNumber::zero()) }
    }

    pub fn copy(p: VariableId, q: VariableId) -> Self {
        Self::Copy { p, q, offset: Interval::singleton(ZNumber::zero()) }
    }

    pub fn copy_shifted(p: VariableId, q: VariableId, offset: Interval<ZNumber>) -> Self {
        Self::Copy { p, q, offset }
    }

    pub fn store(p: VariableId, q: VariableId) -> Self {
        Self::Store { p, q, offset: Interval::singleton(ZNumber::zero()) }
    }

    pub fn load(p: VariableId, q: VariableId) -> Self {
        Self::Load { p, q, offset: Interval::singleton(ZNumber::zero()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_of_defaults_to_a_zero_offset() {
        let c = PointerConstraint::address_of(1, 10);
        match c {
            PointerConstraint::AddressOf { offset, .. } => {
                assert_eq!(offset, Interval::singleton(ZNumber::zero()));
            }
            _ => panic!("expected AddressOf"),
        }
    }
}
