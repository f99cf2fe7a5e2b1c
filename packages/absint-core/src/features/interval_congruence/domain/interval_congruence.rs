//! `IntervalCongruence`: the reduced product `Interval<ZNumber> x Congruence`
//! (spec.md §4.4). Every constructor runs `reduce`, which tightens the
//! interval's endpoints to the nearest value satisfying the congruence (and
//! collapses to bottom if no such value exists in range); the congruence
//! itself is not narrowed by the interval beyond the singleton case, which
//! is the standard asymmetric reduction for this pair of domains.

use crate::features::congruence::domain::congruence::Congruence;
use crate::features::interval::domain::interval::Interval;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::bound::Bound;
use crate::shared::models::number::ZNumber;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalCongruence {
    interval: Interval<ZNumber>,
    congruence: Congruence,
}

impl IntervalCongruence {
    pub fn new(interval: Interval<ZNumber>, congruence: Congruence) -> Self {
        Self { interval, congruence }.reduce()
    }

    pub fn interval(&self) -> &Interval<ZNumber> {
        &self.interval
    }

    pub fn congruence(&self) -> &Congruence {
        &self.congruence
    }

    fn reduce(self) -> Self {
        if self.interval.is_bottom() || self.congruence.is_bottom() {
            return Self { interval: Interval::bottom(), congruence: Congruence::bottom() };
        }
        let modulus = match self.congruence.modulus() {
            Some(m) => m.clone(),
            None => return self,
        };
        if modulus.is_zero() {
            let r = self.congruence.residue().unwrap().clone();
            return if self.interval.contains(&r) {
                Self { interval: Interval::singleton(r), congruence: self.congruence }
            } else {
                Self { interval: Interval::bottom(), congruence: Congruence::bottom() }
            };
        }
        let residue = self.congruence.residue().unwrap().clone();
        let new_lb = match self.interval.lb() {
            Bound::Finite(lb) => {
                let delta = (residue.clone() - lb.clone()).rem_euclid(&modulus);
                Bound::Finite(lb.clone() + delta)
            }
            inf => inf.clone(),
        };
        let new_ub = match self.interval.ub() {
            Bound::Finite(ub) => {
                let delta = (ub.clone() - residue.clone()).rem_euclid(&modulus);
                Bound::Finite(ub.clone() - delta)
            }
            inf => inf.clone(),
        };
        let interval = Interval::new(new_lb, new_ub);
        if interval.is_bottom() {
            Self { interval, congruence: Congruence::bottom() }
        } else {
            Self { interval, congruence: self.congruence }
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::new(self.interval.add(&other.interval), self.congruence.add(&other.congruence))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.interval.sub(&other.interval), self.congruence.sub(&other.congruence))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::new(self.interval.mul(&other.interval), self.congruence.mul(&other.congruence))
    }
}

impl AbstractDomain for IntervalCongruence {
    fn bottom() -> Self {
        Self { interval: Interval::bottom(), congruence: Congruence::bottom() }
    }

    fn top() -> Self {
        Self { interval: Interval::top(), congruence: Congruence::top() }
    }

    fn is_bottom(&self) -> bool {
        self.interval.is_bottom() || self.congruence.is_bottom()
    }

    fn is_top(&self) -> bool {
        self.interval.is_top() && self.congruence.is_top()
    }

    fn leq(&self, other: &Self) -> bool {
        self.interval.leq(&other.interval) && self.congruence.leq(&other.congruence)
    }

    fn join(&self, other: &Self) -> Self {
        Self::new(self.interval.join(&other.interval), self.congruence.join(&other.congruence))
    }

    fn meet(&self, other: &Self) -> Self {
        Self::new(self.interval.meet(&other.interval), self.congruence.meet(&other.congruence))
    }

    fn widening(&self, other: &Self) -> Self {
        Self::new(self.interval.widening(&other.interval), self.congruence.widening(&other.congruence))
    }

    fn widening_threshold(&self, other: &Self, thresholds: &[i64]) -> Self {
        Self::new(
            self.interval.widening_threshold(&other.interval, thresholds),
            self.congruence.widening(&other.congruence),
        )
    }

    fn narrowing(&self, other: &Self) -> Self {
        Self::new(self.interval.narrowing(&other.interval), self.congruence.narrowing(&other.congruence))
    }
}

impl fmt::Display for IntervalCongruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} n {}", self.interval, self.congruence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z(n: i64) -> ZNumber {
        ZNumber::from_i64(n)
    }
    fn iv(lo: i64, hi: i64) -> Interval<ZNumber> {
        Interval::new(Bound::Finite(z(lo)), Bound::Finite(z(hi)))
    }

    #[test]
    fn reduction_tightens_interval_to_nearest_congruent_endpoints() {
        // Even values in [1, 9] are [2, 8].
        let ic = IntervalCongruence::new(iv(1, 9), Congruence::of(z(2), z(0)));
        assert_eq!(*ic.interval(), iv(2, 8));
    }

    #[test]
    fn reduction_to_bottom_when_no_value_in_range_satisfies_congruence() {
        // No even number lies in [3, 3].
        let ic = IntervalCongruence::new(iv(3, 3), Congruence::of(z(2), z(0)));
        assert!(ic.is_bottom());
    }

    #[test]
    fn singleton_congruence_collapses_interval() {
        let ic = IntervalCongruence::new(iv(0, 100), Congruence::singleton(z(42)));
        assert_eq!(*ic.interval(), iv(42, 42));
    }
}
