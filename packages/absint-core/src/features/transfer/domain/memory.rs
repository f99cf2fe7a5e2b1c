//! A flat, interval-only model of memory cell contents, keyed by abstract
//! memory location (spec.md §4.12's `x = *p` / `*p = v` rows).
//!
//! Cell contents are tracked at interval precision regardless of which
//! relational domain backs the rest of the numerical state: relating two
//! different memory cells to each other is out of scope here, matching
//! this codebase's existing choice (see
//! [`crate::features::numerical_domain::domain::non_relational::NonRelationalDomain`])
//! to keep per-location facts non-relational even when the register file
//! itself is relational.

use rustc_hash::FxHashMap;

use crate::features::interval::domain::interval::Interval;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::{MemoryLocationId, ZNumber};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryModel {
    cells: FxHashMap<MemoryLocationId, Interval<ZNumber>>,
}

impl MemoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// An untouched cell is `⊤` (no assignment observed yet, not "no
    /// value possible"), reading it before any store is sound-but-useless
    /// rather than a hard error, since allocator-returned memory is
    /// unspecified, not nonexistent.
    pub fn get(&self, location: MemoryLocationId) -> Interval<ZNumber> {
        self.cells.get(&location).cloned().unwrap_or_else(Interval::top)
    }

    /// A `*p = v` where `p`'s points-to-set is a singleton: the old
    /// contents are irrelevant, this is the cell's new exact value.
    pub fn strong_update(&mut self, location: MemoryLocationId, value: Interval<ZNumber>) {
        if value.is_top() {
            self.cells.remove(&location);
        } else {
            self.cells.insert(location, value);
        }
    }

    /// A `*p = v` where `p` may alias other cells too: the write might or
    /// might not land on this particular cell, so it can only widen what
    /// we know, never narrow it.
    pub fn weak_update(&mut self, location: MemoryLocationId, value: &Interval<ZNumber>) {
        let joined = self.get(location).join(value);
        self.strong_update(location, joined);
    }

    /// Folds every store's non-determinism with the branch that reaches
    /// this point, for the fixpoint iterator's own `join`/`widening`/
    /// `narrowing` over whole-function memory snapshots.
    pub fn join(&self, other: &Self) -> Self {
        self.merge_with(other, |a, b| a.join(b))
    }

    pub fn meet(&self, other: &Self) -> Self {
        self.merge_with(other, |a, b| a.meet(b))
    }

    pub fn widening(&self, other: &Self) -> Self {
        self.merge_with(other, |a, b| a.widening(b))
    }

    pub fn narrowing(&self, other: &Self) -> Self {
        self.merge_with(other, |a, b| a.narrowing(b))
    }

    /// No cell is untracked in `self` but more precise in `other`,
    /// untouched cells read as `⊤` on both sides, so only cells actually
    /// present on either side need comparing.
    pub fn leq(&self, other: &Self) -> bool {
        self.cells.keys().chain(other.cells.keys()).all(|&loc| self.get(loc).leq(&other.get(loc)))
    }

    /// No cells tracked at all: every location still reads as `⊤`.
    pub fn is_top(&self) -> bool {
        self.cells.is_empty()
    }

    fn merge_with(&self, other: &Self, op: impl Fn(&Interval<ZNumber>, &Interval<ZNumber>) -> Interval<ZNumber>) -> Self {
        let mut cells = FxHashMap::default();
        for (&loc, a) in &self.cells {
            let b = other.get(loc);
            let merged = op(a, &b);
            if !merged.is_top() {
                cells.insert(loc, merged);
            }
        }
        for (&loc, b) in &other.cells {
            if !self.cells.contains_key(&loc) {
                let merged = op(&Interval::top(), b);
                if !merged.is_top() {
                    cells.insert(loc, merged);
                }
            }
        }
        Self { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::bound::Bound;

    fn iv(lo: i64, hi: i64) -> Interval<ZNumber> {
        Interval::new(Bound::Finite(ZNumber::from_i64(lo)), Bound::Finite(ZNumber::from_i64(hi)))
    }

    #[test]
    fn an_untouched_cell_reads_as_top() {
        let m = MemoryModel::new();
        assert!(m.get(1).is_top());
    }

    #[test]
    fn strong_update_replaces_the_cell_outright() {
        let mut m = MemoryModel::new();
        m.strong_update(1, iv(0, 10));
        m.strong_update(1, iv(5, 5));
        assert_eq!(m.get(1), iv(5, 5));
    }

    #[test]
    fn weak_update_only_ever_widens_what_is_known() {
        let mut m = MemoryModel::new();
        m.strong_update(1, iv(0, 0));
        m.weak_update(1, &iv(10, 10));
        assert_eq!(m.get(1), iv(0, 10));
    }

    #[test]
    fn a_fresh_model_is_top_and_stops_being_so_once_touched() {
        let mut m = MemoryModel::new();
        assert!(m.is_top());
        m.strong_update(1, iv(0, 0));
        assert!(!m.is_top());
    }

    #[test]
    fn leq_holds_when_every_tracked_cell_is_at_least_as_precise() {
        let mut narrow = MemoryModel::new();
        narrow.strong_update(1, iv(2, 4));
        let mut wide = MemoryModel::new();
        wide.strong_update(1, iv(0, 10));
        assert!(narrow.leq(&wide));
        assert!(!wide.leq(&narrow));
    }
}
