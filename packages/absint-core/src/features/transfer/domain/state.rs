//! The numerical-state contract the symbolic transfer function (spec.md
//! §4.12) programs against. Every backing domain selectable via
//! `NumericalDomainKind` exposes the same small vocabulary, assign an
//! affine combination, forget a variable, add a linear constraint, read a
//! variable's bound, so the transfer function is written once and is
//! generic over `S: NumericalState`.

use crate::features::dbm::domain::matrix::Dbm;
use crate::features::interval::domain::interval::Interval;
use crate::features::linear::domain::constraint::{LinearConstraint, LinearExpression};
use crate::features::numerical_domain::domain::non_relational::NonRelationalDomain;
use crate::features::variable_packing::domain::packing::VariablePacking;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::{VariableId, ZNumber};

pub trait NumericalState: AbstractDomain {
    /// `x ← source + c` (or `x ← c` when `source` is `None`), the one
    /// assignment every domain here can express exactly.
    fn assign(&mut self, x: VariableId, source: Option<VariableId>, c: ZNumber);
    fn forget(&mut self, v: VariableId);
    fn add_constraint(&mut self, constraint: &LinearConstraint);
    fn get_bound(&self, v: VariableId) -> Interval<ZNumber>;

    /// Forgets `v` then re-constrains it to exactly `bound` via
    /// `add_constraint`, the fallback for any non-affine right-hand side
    /// (a multiplication, a call result, a join of several points-to
    /// targets) that can't be expressed as `assign`.
    fn bound_variable(&mut self, v: VariableId, bound: &Interval<ZNumber>) {
        self.forget(v);
        if bound.is_bottom() {
            // Unreachable state: force it to bottom rather than leaving `v`
            // merely unconstrained, so the contradiction isn't lost.
            self.set_to_bottom();
            return;
        }
        if let Some(lb) = bound.lb().as_finite() {
            let expr = LinearExpression::var(v).add(&LinearExpression::constant(-lb.clone()));
            self.add_constraint(&LinearConstraint::new(expr, crate::shared::ir::CompareOperator::Ge));
        }
        if let Some(ub) = bound.ub().as_finite() {
            let expr = LinearExpression::var(v).add(&LinearExpression::constant(-ub.clone()));
            self.add_constraint(&LinearConstraint::new(expr, crate::shared::ir::CompareOperator::Le));
        }
    }
}

impl NumericalState for Dbm {
    fn assign(&mut self, x: VariableId, source: Option<VariableId>, c: ZNumber) {
        Dbm::assign(self, x, source, c)
    }
    fn forget(&mut self, v: VariableId) {
        Dbm::forget(self, v)
    }
    fn add_constraint(&mut self, constraint: &LinearConstraint) {
        Dbm::add_constraint(self, constraint)
    }
    fn get_bound(&self, v: VariableId) -> Interval<ZNumber> {
        Dbm::get_bound(self, v)
    }
}

impl NumericalState for VariablePacking {
    fn assign(&mut self, x: VariableId, source: Option<VariableId>, c: ZNumber) {
        VariablePacking::assign(self, x, source, c)
    }
    fn forget(&mut self, v: VariableId) {
        VariablePacking::forget(self, v)
    }
    fn add_constraint(&mut self, constraint: &LinearConstraint) {
        VariablePacking::add_constraint(self, constraint)
    }
    fn get_bound(&self, v: VariableId) -> Interval<ZNumber> {
        VariablePacking::get_bound(self, v)
    }
}

/// The non-relational backing: `assign`/`add_constraint` work purely off
/// each variable's own interval, since a `NonRelationalDomain` by
/// definition never relates two variables to each other.
impl NumericalState for NonRelationalDomain<Interval<ZNumber>> {
    fn assign(&mut self, x: VariableId, source: Option<VariableId>, c: ZNumber) {
        let value = match source {
            Some(y) => self.get(y).add(&Interval::singleton(c)),
            None => Interval::singleton(c),
        };
        self.set(x, value);
    }

    fn forget(&mut self, v: VariableId) {
        NonRelationalDomain::forget(self, v)
    }

    /// Isolates `v` in `constraint` (if it appears with a nonzero
    /// coefficient) and intersects the implied bound into its interval;
    /// a constraint that doesn't mention `v` at all, or relates several
    /// variables none of which `v` alone determines, is a no-op here,
    /// that reduction is the linear-interval solver's job
    /// ([`crate::features::linear::infrastructure::solver::refine_store`]),
    /// not a single non-relational assignment's.
    fn add_constraint(&mut self, constraint: &LinearConstraint) {
        for (v, c) in constraint.expr.terms().collect::<Vec<_>>() {
            if c.is_zero() {
                continue;
            }
            let rest = constraint.expr.without(v);
            let env = |w: VariableId| self.get(w);
            let rest_val = rest.evaluate(env);
            if rest_val.is_bottom() {
                self.set_to_bottom();
                return;
            }
            let target = rest_val.neg().div(&Interval::singleton(c.clone()));
            let op = if c.is_negative() { flip(constraint.op) } else { constraint.op };
            let current = self.get(v);
            let refined = apply_compare(&current, op, &target);
            self.set(v, refined);
        }
    }

    fn get_bound(&self, v: VariableId) -> Interval<ZNumber> {
        self.get(v)
    }
}

fn flip(op: crate::shared::ir::CompareOperator) -> crate::shared::ir::CompareOperator {
    use crate::shared::ir::CompareOperator::*;
    match op {
        Lt => Gt,
        Le => Ge,
        Gt => Lt,
        Ge => Le,
        Eq => Eq,
        Ne => Ne,
    }
}

fn apply_compare(current: &Interval<ZNumber>, op: crate::shared::ir::CompareOperator, target: &Interval<ZNumber>) -> Interval<ZNumber> {
    use crate::shared::ir::CompareOperator::*;
    match op {
        Eq => current.refine_eq(target),
        Lt => current.refine_lt(target),
        Le => current.refine_le(target),
        Gt => current.refine_gt(target),
        Ge => current.refine_ge(target),
        Ne => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::bound::Bound;

    fn z(n: i64) -> ZNumber {
        ZNumber::from_i64(n)
    }
    fn iv(lo: i64, hi: i64) -> Interval<ZNumber> {
        Interval::new(Bound::Finite(z(lo)), Bound::Finite(z(hi)))
    }

    type Store = NonRelationalDomain<Interval<ZNumber>>;

    #[test]
    fn assign_constant_sets_a_singleton() {
        let mut s = Store::top();
        NumericalState::assign(&mut s, 1, None, z(5));
        assert_eq!(NumericalState::get_bound(&s, 1), iv(5, 5));
    }

    #[test]
    fn assign_affine_shifts_the_source_interval() {
        let mut s = Store::top();
        s.set(2, iv(0, 10));
        NumericalState::assign(&mut s, 1, Some(2), z(3));
        assert_eq!(NumericalState::get_bound(&s, 1), iv(3, 13));
    }

    #[test]
    fn bound_variable_forgets_then_reconstrains() {
        let mut s = Store::top();
        s.set(1, iv(-100, 100));
        NumericalState::bound_variable(&mut s, 1, &iv(0, 10));
        assert_eq!(NumericalState::get_bound(&s, 1), iv(0, 10));
    }

    #[test]
    fn bound_variable_on_bottom_interval_collapses_the_state() {
        let mut s = Store::top();
        NumericalState::bound_variable(&mut s, 1, &Interval::bottom());
        assert!(s.is_bottom());
    }

    #[test]
    fn single_variable_equality_constraint_pins_the_interval() {
        let mut s = Store::top();
        s.set(1, iv(0, 100));
        let expr = LinearExpression::var(1).add(&LinearExpression::constant(z(-5)));
        NumericalState::add_constraint(&mut s, &LinearConstraint::new(expr, crate::shared::ir::CompareOperator::Eq));
        assert_eq!(NumericalState::get_bound(&s, 1), iv(5, 5));
    }
}
