//! The abstract-value contract every lattice in this crate implements
//! (spec.md §3 "Abstract value", invariants 1–5).
//!
//! Every combinator has both a by-value and an in-place form; the in-place
//! form is mandatory (not just an optimization) because the fixpoint
//! iterator mutates large per-block invariants destructively rather than
//! rebuilding them every step (spec.md §3 "Lifecycle").

pub trait AbstractDomain: Clone + PartialEq {
    fn bottom() -> Self;
    fn top() -> Self;

    fn is_bottom(&self) -> bool;
    fn is_top(&self) -> bool;

    fn set_to_bottom(&mut self) {
        *self = Self::bottom();
    }
    fn set_to_top(&mut self) {
        *self = Self::top();
    }

    /// Partial order: `self <= other`.
    fn leq(&self, other: &Self) -> bool;

    fn equals(&self, other: &Self) -> bool {
        self.leq(other) && other.leq(self)
    }

    fn join(&self, other: &Self) -> Self;
    fn join_with(&mut self, other: &Self) {
        *self = self.join(other);
    }

    fn widening(&self, other: &Self) -> Self;
    fn widening_with(&mut self, other: &Self) {
        *self = self.widening(other);
    }

    /// Widen towards the nearest threshold in `thresholds` rather than
    /// straight to `±∞` (spec.md §4.1). The default ignores thresholds and
    /// falls back to ordinary widening; domains for which a threshold is
    /// meaningful (interval, DBM) override it.
    fn widening_threshold(&self, other: &Self, _thresholds: &[i64]) -> Self {
        self.widening(other)
    }
    fn widening_threshold_with(&mut self, other: &Self, thresholds: &[i64]) {
        *self = self.widening_threshold(other, thresholds);
    }

    fn meet(&self, other: &Self) -> Self;
    fn meet_with(&mut self, other: &Self) {
        *self = self.meet(other);
    }

    fn narrowing(&self, other: &Self) -> Self;
    fn narrowing_with(&mut self, other: &Self) {
        *self = self.narrowing(other);
    }

    fn narrowing_threshold(&self, other: &Self, _thresholds: &[i64]) -> Self {
        self.narrowing(other)
    }
    fn narrowing_threshold_with(&mut self, other: &Self, thresholds: &[i64]) {
        *self = self.narrowing_threshold(other, thresholds);
    }
}
