//! `LinearExpression` (`sum(c_i * x_i) + k`) and `LinearConstraint`
//! (`expr op 0`), spec.md §4.5.

use crate::features::interval::domain::interval::Interval;
use crate::shared::ir::CompareOperator;
use crate::shared::models::number::ZNumber;
use crate::shared::models::variable::VariableId;
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpression {
    terms: FxHashMap<VariableId, ZNumber>,
    constant: ZNumber,
}

impl LinearExpression {
    pub fn constant(n: ZNumber) -> Self {
        Self { terms: FxHashMap::default(), constant: n }
    }

    pub fn zero() -> Self {
        Self::constant(ZNumber::zero())
    }

    pub fn var(v: VariableId) -> Self {
        let mut terms = FxHashMap::default();
        terms.insert(v, ZNumber::one());
        Self { terms, constant: ZNumber::zero() }
    }

    pub fn with_term(mut self, v: VariableId, coeff: ZNumber) -> Self {
        if coeff.is_zero() {
            self.terms.remove(&v);
        } else {
            self.terms.insert(v, coeff);
        }
        self
    }

    pub fn terms(&self) -> impl Iterator<Item = (VariableId, &ZNumber)> {
        self.terms.iter().map(|(&v, c)| (v, c))
    }

    pub fn coefficient_of(&self, v: VariableId) -> ZNumber {
        self.terms.get(&v).cloned().unwrap_or_else(ZNumber::zero)
    }

    pub fn constant_term(&self) -> &ZNumber {
        &self.constant
    }

    /// The expression with `v`'s term removed, used to isolate `v` during
    /// refinement (spec.md §4.6).
    pub fn without(&self, v: VariableId) -> Self {
        let mut terms = self.terms.clone();
        terms.remove(&v);
        Self { terms, constant: self.constant.clone() }
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        for (v, c) in &other.terms {
            let entry = terms.entry(*v).or_insert_with(ZNumber::zero);
            *entry = entry.clone() + c.clone();
            if entry.is_zero() {
                terms.remove(v);
            }
        }
        Self { terms, constant: self.constant.clone() + other.constant.clone() }
    }

    pub fn scale(&self, factor: &ZNumber) -> Self {
        let terms = self.terms.iter().map(|(v, c)| (*v, c.clone() * factor.clone())).collect();
        Self { terms, constant: self.constant.clone() * factor.clone() }
    }

    /// Evaluates the expression given an environment assigning each
    /// variable an interval, by substitution (spec.md §4.6).
    pub fn evaluate(&self, env: impl Fn(VariableId) -> Interval<ZNumber>) -> Interval<ZNumber> {
        let mut acc = Interval::singleton(self.constant.clone());
        for (v, c) in &self.terms {
            let term = Interval::singleton(c.clone()).mul(&env(*v));
            acc = acc.add(&term);
        }
        acc
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, c) in &self.terms {
            write!(f, "{}*v{} + ", c, v)?;
        }
        write!(f, "{}", self.constant)
    }
}

/// `expr op 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub expr: LinearExpression,
    pub op: CompareOperator,
}

impl LinearConstraint {
    pub fn new(expr: LinearExpression, op: CompareOperator) -> Self {
        Self { expr, op }
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} 0", self.expr, self.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_removes_only_the_named_variable() {
        let e = LinearExpression::var(1).with_term(2, ZNumber::from_i64(3));
        let reduced = e.without(1);
        assert_eq!(reduced.coefficient_of(1), ZNumber::zero());
        assert_eq!(reduced.coefficient_of(2), ZNumber::from_i64(3));
    }

    #[test]
    fn evaluate_substitutes_variable_intervals() {
        use crate::shared::models::bound::Bound;
        let e = LinearExpression::var(1).with_term(2, ZNumber::from_i64(2));
        let env = |v: VariableId| match v {
            1 => Interval::singleton(ZNumber::from_i64(3)),
            2 => Interval::new(Bound::Finite(ZNumber::from_i64(0)), Bound::Finite(ZNumber::from_i64(5))),
            _ => unreachable!(),
        };
        let result = e.evaluate(env);
        assert_eq!(
            result,
            Interval::new(Bound::Finite(ZNumber::from_i64(3)), Bound::Finite(ZNumber::from_i64(13)))
        );
    }
}
