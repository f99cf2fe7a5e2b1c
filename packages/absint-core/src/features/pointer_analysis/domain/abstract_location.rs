//! Special abstract memory locations and allocation-site id synthesis
//! (spec.md §4.11). Unlike a standalone points-to analysis, this engine's
//! frontend already commits `MemoryLocationId`s to the addressing scheme
//! in [`crate::shared::models::MemoryLocationKind::Dynamic`] (`callsite`
//! + `call_context`), so the analysis doesn't run its own location
//! factory the way a from-scratch Andersen solver would; it just derives
//! a stable id from that same scheme.

use crate::shared::models::{MemoryLocationId, StatementId};

/// The location every null pointer is considered to address. Joining it
/// into a points-to set never refines anything; it exists so a null
/// check can ask "does this set contain only `NULL_LOCATION`?"
pub const NULL_LOCATION: MemoryLocationId = 0;

/// The conservative "points anywhere" location, used when an external
/// call or an unmodeled cast forces the solver to give up precision for
/// one pointer without collapsing the whole set to `PointsToSet::Top`.
pub const UNKNOWN_LOCATION: MemoryLocationId = MemoryLocationId::MAX;

pub fn is_null(location: MemoryLocationId) -> bool {
    location == NULL_LOCATION
}

pub fn is_unknown(location: MemoryLocationId) -> bool {
    location == UNKNOWN_LOCATION
}

/// Derives the `MemoryLocationId` for a dynamic allocation site, stable
/// across repeated visits of the same callsite under the same calling
/// context (spec.md §4.11, §4.12 `x = alloca`).
pub fn synthesize_dynamic_location(callsite: StatementId, call_context: u32) -> MemoryLocationId {
    // Fibonacci hashing keeps nearby callsites from colliding under the
    // small `call_context` values a context-insensitive or k-CFA caller
    // typically hands in; avoids 0 and u32::MAX, which are reserved.
    let mixed = callsite ^ call_context.wrapping_mul(0x9E37_79B1);
    match mixed {
        NULL_LOCATION => 1,
        UNKNOWN_LOCATION => UNKNOWN_LOCATION - 1,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_ids_avoid_the_reserved_sentinels() {
        assert_ne!(synthesize_dynamic_location(0, 0), NULL_LOCATION);
        assert_ne!(synthesize_dynamic_location(u32::MAX, 0x2479_0000), UNKNOWN_LOCATION);
    }

    #[test]
    fn same_callsite_and_context_synthesizes_the_same_location() {
        let a = synthesize_dynamic_location(42, 7);
        let b = synthesize_dynamic_location(42, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn different_contexts_synthesize_different_locations() {
        let a = synthesize_dynamic_location(42, 7);
        let b = synthesize_dynamic_location(42, 8);
        assert_ne!(a, b);
    }
}
