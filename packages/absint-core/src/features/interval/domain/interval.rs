//! `Interval<N>`: the classic `[lb, ub]` numerical abstraction, generic over
//! `N` so integer and rational intervals share one implementation ("Integer
//! and rational intervals share the algorithm; only the underlying number
//! differs").
//!
//! Bottom is represented canonically as `lb = +oo, ub = -oo` rather than as
//! a separate enum variant, so every constructed interval with `lb > ub`
//! collapses to the same value and `PartialEq` on bottoms just works.

use crate::shared::lattice::AbstractDomain;
use crate::shared::models::bound::Bound;
use crate::shared::models::number::ExactNumber;
use std::fmt;

pub type ZInterval = Interval<crate::shared::models::number::ZNumber>;
pub type QInterval = Interval<crate::shared::models::number::QNumber>;

#[derive(Debug, Clone, PartialEq)]
pub struct Interval<N: ExactNumber> {
    lb: Bound<N>,
    ub: Bound<N>,
}

impl<N: ExactNumber> Interval<N> {
    /// Builds `[lb, ub]`, collapsing to the canonical bottom if `lb > ub`.
    pub fn new(lb: Bound<N>, ub: Bound<N>) -> Self {
        if ub.le(&lb) && ub != lb {
            Self::bottom_repr()
        } else {
            Self { lb, ub }
        }
    }

    fn bottom_repr() -> Self {
        Self {
            lb: Bound::PlusInfinity,
            ub: Bound::MinusInfinity,
        }
    }

    pub fn singleton(n: N) -> Self {
        Self {
            lb: Bound::Finite(n.clone()),
            ub: Bound::Finite(n),
        }
    }

    pub fn point_zero() -> Self {
        Self::singleton(N::zero())
    }

    pub fn lb(&self) -> &Bound<N> {
        &self.lb
    }

    pub fn ub(&self) -> &Bound<N> {
        &self.ub
    }

    pub fn is_singleton(&self) -> bool {
        !self.is_bottom() && self.lb == self.ub
    }

    pub fn as_singleton(&self) -> Option<&N> {
        if self.is_singleton() {
            self.lb.as_finite()
        } else {
            None
        }
    }

    pub fn contains(&self, n: &N) -> bool {
        !self.is_bottom()
            && self.lb.le(&Bound::Finite(n.clone()))
            && Bound::Finite(n.clone()).le(&self.ub)
    }

    pub fn is_nonneg(&self) -> bool {
        self.lb.ge(&Bound::Finite(N::zero()))
    }

    pub fn is_nonpos(&self) -> bool {
        self.ub.le(&Bound::Finite(N::zero()))
    }

    pub fn neg(&self) -> Self {
        if self.is_bottom() {
            return self.clone();
        }
        Self {
            lb: -self.ub.clone(),
            ub: -self.lb.clone(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        Self {
            lb: self.lb.clone() + other.lb.clone(),
            ub: self.ub.clone() + other.ub.clone(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        let candidates = [
            self.lb.clone() * other.lb.clone(),
            self.lb.clone() * other.ub.clone(),
            self.ub.clone() * other.lb.clone(),
            self.ub.clone() * other.ub.clone(),
        ];
        let lb = candidates.iter().cloned().reduce(Bound::min).unwrap();
        let ub = candidates.into_iter().reduce(Bound::max).unwrap();
        Self { lb, ub }
    }

    /// Division, splitting the divisor interval around zero and joining the
    /// branch results. Division by the exact interval `[0, 0]` is undefined
    /// and yields bottom: a statement whose divisor abstract value is
    /// exactly zero is unreachable in this state.
    pub fn div(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        if other.is_singleton() && other.as_singleton().unwrap().is_zero() {
            return Self::bottom_repr();
        }
        if !other.contains(&N::zero()) {
            return self.div_nonzero_divisor(other);
        }
        let mut result = Self::bottom_repr();
        if other.lb.le(&Bound::Finite(N::from_i64(-1))) {
            let neg_part = Self::new(other.lb.clone(), Bound::Finite(N::from_i64(-1)));
            if !neg_part.is_bottom() {
                result = result.join(&self.div_nonzero_divisor(&neg_part));
            }
        }
        if Bound::Finite(N::one()).le(&other.ub) {
            let pos_part = Self::new(Bound::Finite(N::one()), other.ub.clone());
            if !pos_part.is_bottom() {
                result = result.join(&self.div_nonzero_divisor(&pos_part));
            }
        }
        result
    }

    fn div_nonzero_divisor(&self, other: &Self) -> Self {
        let candidates = [
            bound_div(&self.lb, &other.lb),
            bound_div(&self.lb, &other.ub),
            bound_div(&self.ub, &other.lb),
            bound_div(&self.ub, &other.ub),
        ];
        let lb = candidates.iter().cloned().reduce(Bound::min).unwrap();
        let ub = candidates.into_iter().reduce(Bound::max).unwrap();
        Self { lb, ub }
    }

    /// Narrows `self` under `self < other` (spec.md §4.12 uses this family
    /// to implement `Compare` statements).
    pub fn refine_lt(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        let new_ub = match &other.ub {
            Bound::Finite(n) => Bound::Finite(n.clone() - N::one()),
            inf => inf.clone(),
        };
        Self::new(self.lb.clone(), self.ub.clone().min(new_ub))
    }

    pub fn refine_le(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        Self::new(self.lb.clone(), self.ub.clone().min(other.ub.clone()))
    }

    pub fn refine_gt(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        let new_lb = match &other.lb {
            Bound::Finite(n) => Bound::Finite(n.clone() + N::one()),
            inf => inf.clone(),
        };
        Self::new(self.lb.clone().max(new_lb), self.ub.clone())
    }

    pub fn refine_ge(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        Self::new(self.lb.clone().max(other.lb.clone()), self.ub.clone())
    }

    pub fn refine_eq(&self, other: &Self) -> Self {
        self.meet(other)
    }

    fn widen_bound(old: &Bound<N>, new: &Bound<N>, towards_plus: bool) -> Bound<N> {
        let worsened = if towards_plus {
            old.le(new) && old != new
        } else {
            new.le(old) && old != new
        };
        if !worsened {
            old.clone()
        } else if towards_plus {
            Bound::PlusInfinity
        } else {
            Bound::MinusInfinity
        }
    }

    /// As `widen_bound`, but when the plain rule would jump to `±oo`, jumps
    /// to the nearest threshold `t` that still covers the new value instead
    /// (spec.md §4.1, §4.13).
    fn widen_bound_threshold(
        old: &Bound<N>,
        new: &Bound<N>,
        towards_plus: bool,
        thresholds: &[i64],
    ) -> Bound<N> {
        let widened = Self::widen_bound(old, new, towards_plus);
        if !widened.is_infinite() {
            return widened;
        }
        let mut best: Option<Bound<N>> = None;
        for &t in thresholds {
            let t = Bound::Finite(N::from_i64(t));
            let covers = if towards_plus { new.le(&t) } else { t.le(new) };
            if !covers {
                continue;
            }
            best = Some(match best {
                None => t,
                Some(b) => {
                    if towards_plus {
                        b.min(t)
                    } else {
                        b.max(t)
                    }
                }
            });
        }
        best.unwrap_or(widened)
    }
}

fn bound_div<N: ExactNumber>(a: &Bound<N>, b: &Bound<N>) -> Bound<N> {
    match (a, b) {
        (Bound::Finite(x), Bound::Finite(y)) => Bound::Finite(x.clone() / y.clone()),
        (Bound::Finite(x), _) if x.is_zero() => Bound::zero(),
        (Bound::MinusInfinity, denom) | (Bound::PlusInfinity, denom) => {
            let negative = a.is_negative() != denom.is_negative();
            if negative {
                Bound::MinusInfinity
            } else {
                Bound::PlusInfinity
            }
        }
        (Bound::Finite(_), Bound::MinusInfinity) | (Bound::Finite(_), Bound::PlusInfinity) => {
            Bound::zero()
        }
    }
}

impl<N: ExactNumber> AbstractDomain for Interval<N> {
    fn bottom() -> Self {
        Self::bottom_repr()
    }

    fn top() -> Self {
        Self {
            lb: Bound::MinusInfinity,
            ub: Bound::PlusInfinity,
        }
    }

    fn is_bottom(&self) -> bool {
        !self.lb.le(&self.ub)
    }

    fn is_top(&self) -> bool {
        self.lb == Bound::MinusInfinity && self.ub == Bound::PlusInfinity
    }

    fn leq(&self, other: &Self) -> bool {
        if self.is_bottom() {
            return true;
        }
        if other.is_bottom() {
            return false;
        }
        other.lb.le(&self.lb) && self.ub.le(&other.ub)
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Self {
            lb: self.lb.clone().min(other.lb.clone()),
            ub: self.ub.clone().max(other.ub.clone()),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        Self::new(
            self.lb.clone().max(other.lb.clone()),
            self.ub.clone().min(other.ub.clone()),
        )
    }

    fn widening(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Self {
            lb: Self::widen_bound(&self.lb, &other.lb, false),
            ub: Self::widen_bound(&self.ub, &other.ub, true),
        }
    }

    fn widening_threshold(&self, other: &Self, thresholds: &[i64]) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        Self {
            lb: Self::widen_bound_threshold(&self.lb, &other.lb, false, thresholds),
            ub: Self::widen_bound_threshold(&self.ub, &other.ub, true, thresholds),
        }
    }

    fn narrowing(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom_repr();
        }
        let lb = if self.lb.is_infinite() { other.lb.clone() } else { self.lb.clone() };
        let ub = if self.ub.is_infinite() { other.ub.clone() } else { self.ub.clone() };
        Self::new(lb, ub)
    }
}

impl<N: ExactNumber> fmt::Display for Interval<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            write!(f, "bottom")
        } else {
            write!(f, "[{}, {}]", self.lb, self.ub)
        }
    }
}
