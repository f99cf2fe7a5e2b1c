//! Linear-interval solver (spec.md §4.6): refines a per-variable interval
//! store against a system of `LinearConstraint`s by isolating one variable
//! at a time (`c*x + rest op 0` => `x op (-rest)/c`) and intersecting the
//! result into the store, iterating until a fixpoint or `max_cycles` is
//! reached, whichever comes first, since the loop is not guaranteed to
//! reach a fixpoint on every system within a fixed budget.

use crate::features::interval::domain::interval::Interval;
use crate::features::linear::domain::constraint::LinearConstraint;
use crate::shared::ir::CompareOperator;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::number::ZNumber;
use crate::shared::models::variable::VariableId;
use rustc_hash::FxHashMap;

pub type IntervalStore = FxHashMap<VariableId, Interval<ZNumber>>;

/// Refines `store` in place against `constraints`, running at most
/// `max_cycles` passes over the whole system. Returns the number of passes
/// actually performed with Some(`this` pass made progress) = reached a
/// fixpoint early.
pub fn refine_store(constraints: &[LinearConstraint], store: &mut IntervalStore, max_cycles: u32) -> u32 {
    let mut cycles_run = 0;
    for _ in 0..max_cycles {
        cycles_run += 1;
        let mut changed = false;
        for constraint in constraints {
            for (var, coeff) in constraint.expr.terms().collect::<Vec<_>>() {
                if coeff.is_zero() {
                    continue;
                }
                let rest = constraint.expr.without(var);
                let env = |v: VariableId| store.get(&v).cloned().unwrap_or_else(Interval::top);
                let rest_val = rest.evaluate(env);
                if rest_val.is_bottom() {
                    store.insert(var, Interval::bottom());
                    changed = true;
                    continue;
                }
                let target = rest_val.neg().div(&Interval::singleton(coeff.clone()));
                let op = if coeff.is_negative() { flip(constraint.op) } else { constraint.op };
                let current = store.get(&var).cloned().unwrap_or_else(Interval::top);
                let refined = apply_op(&current, op, &target);
                if refined != current {
                    changed = true;
                }
                store.insert(var, refined);
            }
        }
        if !changed {
            break;
        }
    }
    cycles_run
}

fn flip(op: CompareOperator) -> CompareOperator {
    match op {
        CompareOperator::Lt => CompareOperator::Gt,
        CompareOperator::Le => CompareOperator::Ge,
        CompareOperator::Gt => CompareOperator::Lt,
        CompareOperator::Ge => CompareOperator::Le,
        CompareOperator::Eq => CompareOperator::Eq,
        CompareOperator::Ne => CompareOperator::Ne,
    }
}

fn apply_op(current: &Interval<ZNumber>, op: CompareOperator, target: &Interval<ZNumber>) -> Interval<ZNumber> {
    match op {
        CompareOperator::Eq => current.refine_eq(target),
        CompareOperator::Lt => current.refine_lt(target),
        CompareOperator::Le => current.refine_le(target),
        CompareOperator::Gt => current.refine_gt(target),
        CompareOperator::Ge => current.refine_ge(target),
        // `!=` does not shrink an interval in general (only the singleton
        // case would), so it is not refined here.
        CompareOperator::Ne => current.clone(),
    }
}
