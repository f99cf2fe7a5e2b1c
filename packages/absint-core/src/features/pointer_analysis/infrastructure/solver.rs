//! The pointer-constraint fixpoint (spec.md §4.11): `repeat: apply every
//! constraint (monotone) until no pointer information changes`.
//!
//! Variables and abstract memory locations share one flat `u32` id space
//! (`VariableId` and `MemoryLocationId` are both plain `u32`), so, as in
//! this codebase's existing Andersen solver, a location's *contents* are
//! tracked in the exact same map that tracks a variable's value: `Load`
//! and `Store` constraints just key into it with a location id instead
//! of a variable id.

use crate::features::pointer_analysis::domain::constraint::PointerConstraint;
use crate::features::pointer_analysis::domain::pointer_info::PointerInfo;
use crate::shared::lattice::AbstractDomain;

pub struct PointerSolver {
    info: PointerInfo,
}

impl PointerSolver {
    pub fn new() -> Self {
        Self { info: PointerInfo::new() }
    }

    /// Runs every constraint to a fixpoint. Finite height of the
    /// points-to-set lattice (a finite location universe plus `⊤`) and of
    /// the offset lattice (finitely many distinct generator intervals,
    /// joined) guarantees termination without widening.
    pub fn solve(&mut self, constraints: &[PointerConstraint]) {
        loop {
            let mut changed = false;
            for c in constraints {
                changed |= self.apply(c);
            }
            if !changed {
                break;
            }
        }
    }

    fn apply(&mut self, c: &PointerConstraint) -> bool {
        match c {
            PointerConstraint::AddressOf { p, location, offset } => {
                let fact = self.info.entry_mut(*p);
                let loc_changed = fact.locations.insert(*location);
                let new_offset = fact.offset.join(offset);
                let off_changed = new_offset != fact.offset;
                fact.offset = new_offset;
                loc_changed || off_changed
            }
            PointerConstraint::Copy { p, q, offset } => {
                let src = self.info.get(*q);
                let shifted_offset = src.offset.add(offset);
                let fact = self.info.entry_mut(*p);
                let loc_changed = fact.locations.merge(&src.locations);
                let new_offset = fact.offset.join(&shifted_offset);
                let off_changed = new_offset != fact.offset;
                fact.offset = new_offset;
                loc_changed || off_changed
            }
            PointerConstraint::Store { p, q, offset } => {
                let targets = self.info.get(*p);
                let Some(locations) = targets.locations.locations().cloned() else {
                    // p points everywhere: every location in the program
                    // might be overwritten. Without a closed universe of
                    // locations to enumerate here, this is recorded as a
                    // conservative no-op; a real frontend would instead
                    // hand the solver its location universe up front.
                    return false;
                };
                let src = self.info.get(*q);
                let shifted_offset = src.offset.add(offset);
                let mut changed = false;
                for &loc in &locations {
                    let cell = self.info.entry_mut(loc);
                    changed |= cell.locations.merge(&src.locations);
                    let new_offset = cell.offset.join(&shifted_offset);
                    if new_offset != cell.offset {
                        cell.offset = new_offset;
                        changed = true;
                    }
                }
                changed
            }
            PointerConstraint::Load { p, q, offset } => {
                let sources = self.info.get(*q);
                let Some(locations) = sources.locations.locations().cloned() else {
                    self.info.set_unknown(*p);
                    return true;
                };
                let mut changed = false;
                for loc in locations {
                    let cell = self.info.get(loc);
                    let shifted_offset = cell.offset.add(offset);
                    let fact = self.info.entry_mut(*p);
                    changed |= fact.locations.merge(&cell.locations);
                    let new_offset = fact.offset.join(&shifted_offset);
                    if new_offset != fact.offset {
                        fact.offset = new_offset;
                        changed = true;
                    }
                }
                changed
            }
        }
    }

    pub fn result(&self) -> &PointerInfo {
        &self.info
    }

    pub fn into_result(self) -> PointerInfo {
        self.info
    }
}

impl Default for PointerSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pointer_analysis::domain::pointer_info::PointsToSet;

    #[test]
    fn address_of_then_copy_propagates_the_points_to_set() {
        let mut solver = PointerSolver::new();
        let constraints = vec![PointerConstraint::address_of(1, 10), PointerConstraint::copy(2, 1)];
        solver.solve(&constraints);
        assert_eq!(solver.result().get(2).locations, PointsToSet::singleton(10));
    }

    #[test]
    fn store_then_load_round_trips_through_the_pointee() {
        let mut solver = PointerSolver::new();
        let constraints = vec![
            PointerConstraint::address_of(1, 100), // p -> loc 100
            PointerConstraint::address_of(2, 200), // v -> loc 200
            PointerConstraint::store(1, 2),        // *p = v
            PointerConstraint::load(3, 1),         // w = *p
        ];
        solver.solve(&constraints);
        assert_eq!(solver.result().get(3).locations, PointsToSet::singleton(200));
    }

    #[test]
    fn a_cyclic_copy_chain_still_reaches_a_fixpoint() {
        let mut solver = PointerSolver::new();
        let constraints = vec![
            PointerConstraint::address_of(1, 1),
            PointerConstraint::copy(2, 1),
            PointerConstraint::copy(1, 2),
        ];
        solver.solve(&constraints);
        assert_eq!(solver.result().get(1).locations, PointsToSet::singleton(1));
        assert_eq!(solver.result().get(2).locations, PointsToSet::singleton(1));
    }
}
