//! The pointer-information domain (spec.md §4.11): for each pointer
//! variable, a pair `(points-to-set, offset-interval)`. Points-to-set is
//! a finite set of abstract memory locations with a `⊤` (unknown)
//! element; finite height there is what lets the solver (§4.11) run to
//! a fixpoint with plain `join`, no widening.

use crate::features::interval::domain::interval::Interval;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::{MemoryLocationId, VariableId, ZNumber};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PointsToSet {
    Locations(FxHashSet<MemoryLocationId>),
    Top,
}

impl PointsToSet {
    pub fn empty() -> Self {
        Self::Locations(FxHashSet::default())
    }

    pub fn top() -> Self {
        Self::Top
    }

    pub fn singleton(location: MemoryLocationId) -> Self {
        let mut set = FxHashSet::default();
        set.insert(location);
        Self::Locations(set)
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Self::Top)
    }

    pub fn locations(&self) -> Option<&FxHashSet<MemoryLocationId>> {
        match self {
            Self::Top => None,
            Self::Locations(s) => Some(s),
        }
    }

    /// Merges `other` in, returning whether `self` changed (worklist
    /// re-queue signal, spec.md §4.11's "repeat ... until no pointer
    /// information changes").
    pub fn merge(&mut self, other: &Self) -> bool {
        match (&mut *self, other) {
            (Self::Top, _) => false,
            (_, Self::Top) => {
                *self = Self::Top;
                true
            }
            (Self::Locations(a), Self::Locations(b)) => {
                let before = a.len();
                a.extend(b.iter().copied());
                a.len() != before
            }
        }
    }

    pub fn insert(&mut self, location: MemoryLocationId) -> bool {
        match self {
            Self::Top => false,
            Self::Locations(s) => s.insert(location),
        }
    }
}

impl fmt::Display for PointsToSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "T"),
            Self::Locations(s) => {
                write!(f, "{{")?;
                for (i, loc) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", loc)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One variable's pointer fact: what it may address, and by how much
/// that address may be shifted from the allocation's base.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerFact {
    pub locations: PointsToSet,
    pub offset: Interval<ZNumber>,
}

impl PointerFact {
    pub fn bottom() -> Self {
        Self { locations: PointsToSet::empty(), offset: Interval::bottom() }
    }

    pub fn unknown() -> Self {
        Self { locations: PointsToSet::top(), offset: Interval::top() }
    }

    pub fn merge(&mut self, other: &Self) -> bool {
        let loc_changed = self.locations.merge(&other.locations);
        let new_offset = self.offset.join(&other.offset);
        let off_changed = new_offset != self.offset;
        self.offset = new_offset;
        loc_changed || off_changed
    }
}

/// The full per-variable pointer-information map produced by
/// [`crate::features::pointer_analysis::PointerSolver`].
#[derive(Debug, Clone, Default)]
pub struct PointerInfo {
    facts: FxHashMap<VariableId, PointerFact>,
}

impl PointerInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// An untouched variable has never been the target of a pointer
    /// constraint, so its fact is `⊥` (empty points-to-set): the most
    /// precise, least-surprising default for a monotonically growing set.
    pub fn get(&self, v: VariableId) -> PointerFact {
        self.facts.get(&v).cloned().unwrap_or_else(PointerFact::bottom)
    }

    pub fn set_unknown(&mut self, v: VariableId) {
        self.facts.insert(v, PointerFact::unknown());
    }

    pub fn entry_mut(&mut self, v: VariableId) -> &mut PointerFact {
        self.facts.entry(v).or_insert_with(PointerFact::bottom)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &PointerFact)> {
        self.facts.iter().map(|(&v, f)| (v, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_untouched_variable_has_an_empty_points_to_set() {
        let info = PointerInfo::new();
        assert_eq!(info.get(1).locations, PointsToSet::empty());
    }

    #[test]
    fn merging_top_into_a_set_absorbs_it() {
        let mut pts = PointsToSet::singleton(5);
        assert!(pts.merge(&PointsToSet::Top));
        assert!(pts.is_top());
    }

    #[test]
    fn merge_reports_no_change_once_stable() {
        let mut a = PointsToSet::singleton(1);
        assert!(!a.merge(&PointsToSet::singleton(1)));
    }
}
