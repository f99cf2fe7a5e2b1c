//! The in-memory `(program-point, call-context) -> abstract value`
//! mapping (spec.md §4.14). Persistence is delegated entirely to the
//! external results database (§6); this type only owns the map and
//! offers a read-only iterator over it.

use rustc_hash::FxHashMap;

use super::program_point::ProgramPoint;
use crate::shared::lattice::AbstractDomain;

#[derive(Debug, Clone, Default)]
pub struct ResultsTable<D> {
    invariants: FxHashMap<ProgramPoint, D>,
}

impl<D: AbstractDomain> ResultsTable<D> {
    pub fn new() -> Self {
        Self { invariants: FxHashMap::default() }
    }

    pub fn record(&mut self, point: ProgramPoint, value: D) {
        self.invariants.insert(point, value);
    }

    pub fn get(&self, point: ProgramPoint) -> Option<&D> {
        self.invariants.get(&point)
    }

    /// §4.14: "the iterator treats `⊥` as a sink", a point recorded as
    /// bottom is unreachable, not merely missing.
    pub fn is_unreachable(&self, point: ProgramPoint) -> bool {
        self.get(point).map(D::is_bottom).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProgramPoint, &D)> {
        self.invariants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interval::domain::interval::Interval;
    use crate::shared::models::ZNumber;

    #[test]
    fn a_recorded_point_round_trips() {
        let mut t: ResultsTable<Interval<ZNumber>> = ResultsTable::new();
        let p = ProgramPoint::new(0, 1, 2);
        t.record(p, Interval::singleton(ZNumber::from_i64(5)));
        assert_eq!(t.get(p), Some(&Interval::singleton(ZNumber::from_i64(5))));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn an_unrecorded_point_is_neither_present_nor_unreachable() {
        let t: ResultsTable<Interval<ZNumber>> = ResultsTable::new();
        let p = ProgramPoint::new(0, 1, 2);
        assert!(t.get(p).is_none());
        assert!(!t.is_unreachable(p));
    }

    #[test]
    fn a_bottom_invariant_is_reported_unreachable() {
        let mut t: ResultsTable<Interval<ZNumber>> = ResultsTable::new();
        let p = ProgramPoint::new(0, 1, 2);
        t.record(p, Interval::bottom());
        assert!(t.is_unreachable(p));
    }

    #[test]
    fn iteration_sees_every_recorded_point() {
        let mut t: ResultsTable<Interval<ZNumber>> = ResultsTable::new();
        t.record(ProgramPoint::new(0, 0, 0), Interval::top());
        t.record(ProgramPoint::new(0, 0, 1), Interval::top());
        assert_eq!(t.iter().count(), 2);
    }
}
