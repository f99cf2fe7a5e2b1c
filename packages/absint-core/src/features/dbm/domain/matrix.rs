//! Difference-bound matrix (spec.md §4.8): a conjunction of constraints
//! `xi - xj <= c`, plus a distinguished zero dimension `v0` so a plain
//! bound `xi <= c` is just `xi - v0 <= c`.
//!
//! `M[i][j]` is always an upper bound on `xi - xj` (`i`/`j` are matrix
//! dimensions, dimension `0` is `v0`). Closure (Floyd-Warshall) is kept
//! lazy behind `is_normalized`, per §4.8: operations that combine two
//! matrices close both operands first; single-edge updates (`assign`, a
//! one- or two-variable `add`) try to patch the closure incrementally
//! from the touched vertex instead of paying full O(n^3) (§4.17).

use crate::features::interval::domain::interval::Interval;
use crate::features::linear::domain::constraint::LinearConstraint;
use crate::shared::ir::CompareOperator;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::bound::Bound;
use crate::shared::models::number::ZNumber;
use crate::shared::models::variable::VariableId;
use rustc_hash::FxHashMap;
use std::fmt;

type Cell = Bound<ZNumber>;

#[derive(Debug, Clone)]
pub enum Dbm {
    Bottom,
    Matrix {
        vars: Vec<VariableId>,
        index: FxHashMap<VariableId, usize>,
        m: Vec<Vec<Cell>>,
        is_normalized: bool,
    },
}

impl Dbm {
    pub fn top() -> Self {
        Self::Matrix {
            vars: Vec::new(),
            index: FxHashMap::default(),
            m: vec![vec![Bound::zero()]],
            is_normalized: true,
        }
    }

    pub fn bottom() -> Self {
        Self::Bottom
    }

    pub fn vars(&self) -> &[VariableId] {
        match self {
            Self::Bottom => &[],
            Self::Matrix { vars, .. } => vars,
        }
    }

    fn dim_of(&self, v: VariableId) -> Option<usize> {
        match self {
            Self::Bottom => None,
            Self::Matrix { index, .. } => index.get(&v).copied(),
        }
    }

    /// Adds `v` as a fresh, fully unconstrained dimension if it isn't
    /// tracked yet; returns its matrix index either way.
    fn ensure_var(&mut self, v: VariableId) -> usize {
        if let Some(d) = self.dim_of(v) {
            return d;
        }
        match self {
            Self::Bottom => unreachable!("caller must check is_bottom before mutating"),
            Self::Matrix { vars, index, m, .. } => {
                let new_dim = m.len();
                for row in m.iter_mut() {
                    row.push(Bound::PlusInfinity);
                }
                let mut new_row = vec![Bound::PlusInfinity; new_dim + 1];
                new_row[new_dim] = Bound::zero();
                m.push(new_row);
                vars.push(v);
                index.insert(v, new_dim);
                new_dim
            }
        }
    }

    fn has_negative_diagonal(&self) -> bool {
        match self {
            Self::Bottom => false,
            Self::Matrix { m, .. } => (0..m.len()).any(|i| m[i][i].is_negative()),
        }
    }

    fn close_in_place(&mut self) {
        let m = match self {
            Self::Bottom => return,
            Self::Matrix { is_normalized, .. } if *is_normalized => return,
            Self::Matrix { m, .. } => m,
        };
        let n = m.len();
        for k in 0..n {
            for i in 0..n {
                if m[i][k] == Bound::PlusInfinity {
                    continue;
                }
                for j in 0..n {
                    let via = m[i][k].clone() + m[k][j].clone();
                    if via < m[i][j] {
                        m[i][j] = via;
                    }
                }
            }
        }
        if let Self::Matrix { is_normalized, .. } = self {
            *is_normalized = true;
        }
        if self.has_negative_diagonal() {
            *self = Self::Bottom;
        }
    }

    pub fn ensure_normalized(&mut self) {
        self.close_in_place();
    }

    fn closed(&self) -> Self {
        let mut c = self.clone();
        c.close_in_place();
        c
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self.closed(), Self::Bottom)
    }

    pub fn is_top(&self) -> bool {
        match self.closed() {
            Self::Bottom => false,
            Self::Matrix { m, .. } => {
                let n = m.len();
                (0..n).all(|i| (0..n).all(|j| i == j || m[i][j] == Bound::PlusInfinity))
            }
        }
    }

    fn union_vars(&self, other: &Self) -> Vec<VariableId> {
        let mut out = self.vars().to_vec();
        for v in other.vars() {
            if !out.contains(v) {
                out.push(*v);
            }
        }
        out
    }

    /// Rebuilds `self`'s matrix over a superset `union` of variables,
    /// leaving any dimension `self` doesn't track at `+inf` (unconstrained).
    fn expand_to(&self, union: &[VariableId]) -> Vec<Vec<Cell>> {
        let n = union.len() + 1;
        let mut out = vec![vec![Bound::PlusInfinity; n]; n];
        for (i, row) in out.iter_mut().enumerate() {
            row[i] = Bound::zero();
        }
        if let Self::Matrix { index, m, .. } = self {
            let pos = |v: VariableId| index.get(&v).copied();
            for (p, &v) in union.iter().enumerate() {
                if let Some(sp) = pos(v) {
                    out[0][p + 1] = m[0][sp].clone();
                    out[p + 1][0] = m[sp][0].clone();
                }
            }
            for (p1, &v1) in union.iter().enumerate() {
                let Some(sp1) = pos(v1) else { continue };
                for (p2, &v2) in union.iter().enumerate() {
                    if p1 == p2 {
                        continue;
                    }
                    if let Some(sp2) = pos(v2) {
                        out[p1 + 1][p2 + 1] = m[sp1][sp2].clone();
                    }
                }
            }
        }
        out
    }

    fn from_aligned(union: Vec<VariableId>, m: Vec<Vec<Cell>>) -> Self {
        let index = union.iter().enumerate().map(|(i, &v)| (v, i + 1)).collect();
        Self::Matrix { vars: union, index, m, is_normalized: false }
    }

    pub fn leq(&self, other: &Self) -> bool {
        let a = self.closed();
        let b = other.closed();
        match (&a, &b) {
            (Self::Bottom, _) => true,
            (_, Self::Bottom) => false,
            (Self::Matrix { .. }, Self::Matrix { .. }) => {
                let union = a.union_vars(&b);
                let ea = a.expand_to(&union);
                let eb = b.expand_to(&union);
                ea.iter().zip(eb.iter()).all(|(ra, rb)| ra.iter().zip(rb.iter()).all(|(x, y)| x.le(y)))
            }
        }
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.leq(other) && other.leq(self)
    }

    pub fn join(&self, other: &Self) -> Self {
        let a = self.closed();
        let b = other.closed();
        match (&a, &b) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            _ => {
                let union = a.union_vars(&b);
                let ea = a.expand_to(&union);
                let eb = b.expand_to(&union);
                let m = pointwise(&ea, &eb, |x, y| x.clone().max(y.clone()));
                Self::from_aligned(union, m)
            }
        }
    }

    pub fn meet(&self, other: &Self) -> Self {
        let a = self.closed();
        let b = other.closed();
        if matches!(a, Self::Bottom) || matches!(b, Self::Bottom) {
            return Self::Bottom;
        }
        let union = a.union_vars(&b);
        let ea = a.expand_to(&union);
        let eb = b.expand_to(&union);
        let m = pointwise(&ea, &eb, |x, y| x.clone().min(y.clone()));
        Self::from_aligned(union, m)
    }

    /// A bound that strictly worsened (got weaker) is pushed to `+inf`;
    /// stable or improving bounds are kept, per §4.8.
    pub fn widening(&self, other: &Self) -> Self {
        let a = self.closed();
        let b = other.closed();
        match (&a, &b) {
            (Self::Bottom, _) => b,
            (_, Self::Bottom) => a,
            _ => {
                let union = a.union_vars(&b);
                let ea = a.expand_to(&union);
                let eb = b.expand_to(&union);
                let m = pointwise(&ea, &eb, |old, new| if !new.le(old) { Bound::PlusInfinity } else { old.clone() });
                Self::from_aligned(union, m)
            }
        }
    }

    pub fn widening_threshold(&self, other: &Self, _thresholds: &[i64]) -> Self {
        // DBM edges carry no per-variable threshold axis; fall back to
        // plain widening (a sound, if less precise, answer).
        self.widening(other)
    }

    /// `+inf` entries on the left are replaced by the right's bound; all
    /// other entries are kept, per §4.8.
    pub fn narrowing(&self, other: &Self) -> Self {
        let a = self.closed();
        let b = other.closed();
        match (&a, &b) {
            (Self::Bottom, _) | (_, Self::Bottom) => Self::Bottom,
            _ => {
                let union = a.union_vars(&b);
                let ea = a.expand_to(&union);
                let eb = b.expand_to(&union);
                let m = pointwise(&ea, &eb, |old, new| if *old == Bound::PlusInfinity { new.clone() } else { old.clone() });
                Self::from_aligned(union, m)
            }
        }
    }

    fn reset_var_edges(&mut self, xdim: usize) {
        if let Self::Matrix { m, .. } = self {
            let n = m.len();
            for k in 0..n {
                if k == xdim {
                    continue;
                }
                m[xdim][k] = Bound::PlusInfinity;
                m[k][xdim] = Bound::PlusInfinity;
            }
        }
    }

    /// One Floyd-Warshall relaxation pass pivoting on `ydim`: propagates
    /// `M[x][y] + M[y][k]` and `M[k][y] + M[y][x]` into row/col `xdim`.
    fn relax_through(&mut self, xdim: usize, ydim: usize) {
        if let Self::Matrix { m, .. } = self {
            let n = m.len();
            for k in 0..n {
                let via_out = m[xdim][ydim].clone() + m[ydim][k].clone();
                if via_out < m[xdim][k] {
                    m[xdim][k] = via_out;
                }
                let via_in = m[k][ydim].clone() + m[ydim][xdim].clone();
                if via_in < m[k][xdim] {
                    m[k][xdim] = via_in;
                }
            }
        }
    }

    /// Incremental closure after tightening a single edge `xdim -> ydim`
    /// directly (not through the zero dimension): every pair `(i, j)` may
    /// now have a shorter path `i -> xdim -> ydim -> j` through the new
    /// edge. Since the rest of the matrix was already closed before this
    /// one edge changed, one O(n^2) pass considering exactly that new
    /// middle hop is enough, no need for [`Self::close_in_place`]'s full
    /// O(n^3) re-closure (§4.17).
    fn relax_through_edge(&mut self, xdim: usize, ydim: usize) {
        if let Self::Matrix { m, .. } = self {
            let n = m.len();
            let via_edge = m[xdim][ydim].clone();
            for i in 0..n {
                if m[i][xdim] == Bound::PlusInfinity {
                    continue;
                }
                let via_x = m[i][xdim].clone() + via_edge.clone();
                for j in 0..n {
                    let via = via_x.clone() + m[ydim][j].clone();
                    if via < m[i][j] {
                        m[i][j] = via;
                    }
                }
            }
        }
    }

    fn shift_var(&mut self, x: VariableId, c: &ZNumber) {
        let xdim = self.ensure_var(x);
        if let Self::Matrix { m, .. } = self {
            let n = m.len();
            for k in 0..n {
                if k == xdim {
                    continue;
                }
                m[xdim][k] = m[xdim][k].clone() + Bound::Finite(c.clone());
                m[k][xdim] = m[k][xdim].clone() + Bound::Finite(-c.clone());
            }
        }
    }

    /// `x := y + c` (or `x := c` when `source` is `None`, i.e. `y = v0`),
    /// updated incrementally from the touched vertex (§4.17) rather than
    /// by a full re-closure.
    pub fn assign(&mut self, x: VariableId, source: Option<VariableId>, c: ZNumber) {
        if matches!(self, Self::Bottom) {
            return;
        }
        self.ensure_normalized();
        if matches!(self, Self::Bottom) {
            return;
        }
        if source == Some(x) {
            self.shift_var(x, &c);
            return;
        }
        let ydim = match source {
            Some(y) => self.ensure_var(y),
            None => 0,
        };
        let xdim = self.ensure_var(x);
        self.reset_var_edges(xdim);
        if let Self::Matrix { m, .. } = self {
            m[xdim][ydim] = Bound::Finite(c.clone());
            m[ydim][xdim] = Bound::Finite(-c);
        }
        self.relax_through(xdim, ydim);
        if self.has_negative_diagonal() {
            *self = Self::Bottom;
        }
    }

    /// Arbitrary linear assigns that don't fit `x := y + c` are outside
    /// this domain's vocabulary; callers fall back to projecting the
    /// right-hand side through the interval/linear-solver layer and
    /// calling `forget` + `add_constraint` with the resulting bound.
    pub fn forget(&mut self, v: VariableId) {
        if matches!(self, Self::Bottom) {
            return;
        }
        self.ensure_normalized();
        if matches!(self, Self::Bottom) {
            return;
        }
        if let Some(vdim) = self.dim_of(v) {
            // Already fully closed above, so row/col `v` already reflects
            // every bound reachable through it; nothing to salvage before
            // resetting it to `+inf`.
            self.reset_var_edges(vdim);
        }
    }

    /// Patterns a constraint into direct DBM edges when it mentions one
    /// or two variables with unit coefficients; anything else (non-unit
    /// coefficients, three or more variables) is left untouched for the
    /// caller's linear-interval solver to handle instead (§4.8).
    pub fn add_constraint(&mut self, constraint: &LinearConstraint) {
        if matches!(self, Self::Bottom) {
            return;
        }
        let terms: Vec<(VariableId, ZNumber)> = constraint.expr.terms().map(|(v, c)| (v, c.clone())).collect();
        let k = constraint.expr.constant_term().clone();
        match terms.as_slice() {
            [(x, c)] => match coeff_sign(c) {
                Some(true) => self.add_unit_bound(*x, k, constraint.op),
                Some(false) => self.add_unit_bound(*x, -k, swap_direction(constraint.op)),
                None => {}
            },
            [(x, cx), (y, cy)] => match (coeff_sign(cx), coeff_sign(cy)) {
                (Some(true), Some(false)) => self.add_diff_bound(*x, *y, k, constraint.op),
                (Some(false), Some(true)) => self.add_diff_bound(*y, *x, k, constraint.op),
                _ => {}
            },
            _ => {}
        }
    }

    /// `x + k op 0`, i.e. `x op -k`.
    fn add_unit_bound(&mut self, x: VariableId, k: ZNumber, op: CompareOperator) {
        let target = -k;
        let xdim = self.ensure_var(x);
        match op {
            CompareOperator::Le => self.tighten(xdim, 0, target),
            CompareOperator::Lt => self.tighten(xdim, 0, target - ZNumber::one()),
            CompareOperator::Ge => self.tighten(0, xdim, -target),
            CompareOperator::Gt => self.tighten(0, xdim, -target - ZNumber::one()),
            CompareOperator::Eq => {
                self.tighten(xdim, 0, target.clone());
                self.tighten(0, xdim, -target);
            }
            CompareOperator::Ne => {}
        }
        self.relax_through(xdim, 0);
        if self.has_negative_diagonal() {
            *self = Self::Bottom;
        }
    }

    /// `x - y + k op 0`, i.e. `x - y op -k`, updated incrementally from the
    /// touched edge (§4.17) exactly like [`Self::add_unit_bound`], just
    /// pivoting through the new `xdim -> ydim` edge instead of through `0`.
    fn add_diff_bound(&mut self, x: VariableId, y: VariableId, k: ZNumber, op: CompareOperator) {
        let target = -k;
        let xdim = self.ensure_var(x);
        let ydim = self.ensure_var(y);
        match op {
            CompareOperator::Le => {
                self.tighten(xdim, ydim, target);
                self.relax_through_edge(xdim, ydim);
            }
            CompareOperator::Lt => {
                self.tighten(xdim, ydim, target - ZNumber::one());
                self.relax_through_edge(xdim, ydim);
            }
            CompareOperator::Ge => {
                self.tighten(ydim, xdim, -target);
                self.relax_through_edge(ydim, xdim);
            }
            CompareOperator::Gt => {
                self.tighten(ydim, xdim, -target - ZNumber::one());
                self.relax_through_edge(ydim, xdim);
            }
            CompareOperator::Eq => {
                self.tighten(xdim, ydim, target.clone());
                self.relax_through_edge(xdim, ydim);
                self.tighten(ydim, xdim, -target);
                self.relax_through_edge(ydim, xdim);
            }
            CompareOperator::Ne => {}
        }
        if self.has_negative_diagonal() {
            *self = Self::Bottom;
        }
    }

    fn tighten(&mut self, i: usize, j: usize, bound: ZNumber) {
        if let Self::Matrix { m, .. } = self {
            let candidate = Bound::Finite(bound);
            if candidate < m[i][j] {
                m[i][j] = candidate;
            }
        }
    }

    /// The interval implied for `v` alone: `[-M[0][v], M[v][0]]`.
    pub fn get_bound(&self, v: VariableId) -> Interval<ZNumber> {
        let c = self.closed();
        match &c {
            Self::Bottom => Interval::bottom(),
            Self::Matrix { m, .. } => match c.dim_of(v) {
                None => Interval::top(),
                Some(dv) => {
                    let ub = m[dv][0].clone();
                    let lb = match &m[0][dv] {
                        Bound::Finite(n) => Bound::Finite(-n.clone()),
                        Bound::PlusInfinity => Bound::MinusInfinity,
                        Bound::MinusInfinity => Bound::PlusInfinity,
                    };
                    Interval::new(lb, ub)
                }
            },
        }
    }
}

fn pointwise(a: &[Vec<Cell>], b: &[Vec<Cell>], f: impl Fn(&Cell, &Cell) -> Cell) -> Vec<Vec<Cell>> {
    a.iter().zip(b.iter()).map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(x, y)| f(x, y)).collect()).collect()
}

fn coeff_sign(c: &ZNumber) -> Option<bool> {
    if *c == ZNumber::one() {
        Some(true)
    } else if *c == -ZNumber::one() {
        Some(false)
    } else {
        None
    }
}

fn swap_direction(op: CompareOperator) -> CompareOperator {
    match op {
        CompareOperator::Lt => CompareOperator::Gt,
        CompareOperator::Le => CompareOperator::Ge,
        CompareOperator::Gt => CompareOperator::Lt,
        CompareOperator::Ge => CompareOperator::Le,
        CompareOperator::Eq => CompareOperator::Eq,
        CompareOperator::Ne => CompareOperator::Ne,
    }
}

impl PartialEq for Dbm {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl AbstractDomain for Dbm {
    fn bottom() -> Self {
        Self::bottom()
    }

    fn top() -> Self {
        Self::top()
    }

    fn is_bottom(&self) -> bool {
        Self::is_bottom(self)
    }

    fn is_top(&self) -> bool {
        Self::is_top(self)
    }

    fn leq(&self, other: &Self) -> bool {
        Self::leq(self, other)
    }

    fn join(&self, other: &Self) -> Self {
        Self::join(self, other)
    }

    fn widening(&self, other: &Self) -> Self {
        Self::widening(self, other)
    }

    fn widening_threshold(&self, other: &Self, thresholds: &[i64]) -> Self {
        Self::widening_threshold(self, other, thresholds)
    }

    fn meet(&self, other: &Self) -> Self {
        Self::meet(self, other)
    }

    fn narrowing(&self, other: &Self) -> Self {
        Self::narrowing(self, other)
    }
}

impl fmt::Display for Dbm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bottom => write!(f, "_|_"),
            Self::Matrix { vars, index, m, .. } => {
                write!(f, "{{")?;
                let mut first = true;
                for &vi in vars {
                    let i = index[&vi];
                    if let Bound::Finite(c) = &m[i][0] {
                        if !first {
                            write!(f, ", ")?;
                        }
                        write!(f, "v{} <= {}", vi, c)?;
                        first = false;
                    }
                    if let Bound::Finite(c) = &m[0][i] {
                        if !first {
                            write!(f, ", ")?;
                        }
                        write!(f, "v{} >= {}", vi, -c.clone())?;
                        first = false;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::linear::domain::constraint::LinearExpression;

    fn z(n: i64) -> ZNumber {
        ZNumber::from_i64(n)
    }

    fn le(v: VariableId, c: i64) -> LinearConstraint {
        LinearConstraint::new(LinearExpression::var(v).add(&LinearExpression::constant(z(-c))), CompareOperator::Le)
    }

    fn ge(v: VariableId, c: i64) -> LinearConstraint {
        LinearConstraint::new(LinearExpression::var(v).add(&LinearExpression::constant(z(-c))), CompareOperator::Ge)
    }

    #[test]
    fn closure_propagates_a_difference_bound_through_a_unit_bound() {
        let mut d = Dbm::top();
        d.add_constraint(&le(1, 5)); // x <= 5
        let diff = LinearConstraint::new(
            LinearExpression::var(2).with_term(1, z(-1)).add(&LinearExpression::constant(z(2))),
            CompareOperator::Le,
        ); // y - x + 2 <= 0  =>  y <= x - 2
        d.add_constraint(&diff);
        let y_bound = d.get_bound(2);
        assert_eq!(y_bound.ub(), &Bound::Finite(z(3)));
    }

    #[test]
    fn contradictory_unit_bounds_collapse_to_bottom() {
        let mut d = Dbm::top();
        d.add_constraint(&le(1, 1));
        d.add_constraint(&ge(1, 5));
        assert!(d.is_bottom());
    }

    #[test]
    fn join_keeps_only_the_looser_bound() {
        let mut a = Dbm::top();
        a.add_constraint(&le(1, 3));
        let mut b = Dbm::top();
        b.add_constraint(&le(1, 7));
        let joined = a.join(&b);
        assert_eq!(joined.get_bound(1).ub(), &Bound::Finite(z(7)));
    }

    #[test]
    fn meet_keeps_the_tighter_bound_from_either_side() {
        let mut a = Dbm::top();
        a.add_constraint(&le(1, 3));
        let mut b = Dbm::top();
        b.add_constraint(&ge(1, 0));
        let met = a.meet(&b);
        assert_eq!(met.get_bound(1).ub(), &Bound::Finite(z(3)));
        assert_eq!(met.get_bound(1).lb(), &Bound::Finite(z(0)));
    }

    #[test]
    fn widening_sends_a_worsening_bound_to_infinity() {
        let mut a = Dbm::top();
        a.add_constraint(&le(1, 3));
        let mut b = Dbm::top();
        b.add_constraint(&le(1, 100));
        let widened = a.widening(&b);
        assert_eq!(widened.get_bound(1).ub(), &Bound::PlusInfinity);
    }

    #[test]
    fn narrowing_replaces_infinity_with_the_new_finite_bound() {
        let mut a = Dbm::top();
        a.add_constraint(&le(1, 3));
        let widened_away = Dbm::top(); // v1 unconstrained, ub = +inf
        let mut tightened_again = Dbm::top();
        tightened_again.add_constraint(&le(1, 10));
        let narrowed = widened_away.narrowing(&tightened_again);
        assert_eq!(narrowed.get_bound(1).ub(), &Bound::Finite(z(10)));
        let _ = &a; // keep `a` around to mirror how this domain is actually driven (widen then narrow)
    }

    #[test]
    fn assign_shifts_the_source_variables_bound() {
        let mut d = Dbm::top();
        d.add_constraint(&le(1, 5)); // x <= 5
        d.assign(2, Some(1), z(3)); // y := x + 3
        assert_eq!(d.get_bound(2).ub(), &Bound::Finite(z(8)));
    }

    #[test]
    fn forget_drops_bounds_on_the_forgotten_variable_only() {
        let mut d = Dbm::top();
        d.add_constraint(&le(1, 5));
        d.add_constraint(&le(2, 9));
        d.forget(1);
        assert!(d.get_bound(1).is_top());
        assert_eq!(d.get_bound(2).ub(), &Bound::Finite(z(9)));
    }

    #[test]
    fn two_diff_bounds_chain_without_any_unit_bound_in_between() {
        // y - x <= 2, z - y <= 3 => z - x <= 5, read off via x <= 10.
        let mut d = Dbm::top();
        d.add_constraint(&le(1, 10)); // x <= 10
        let y_minus_x = LinearConstraint::new(
            LinearExpression::var(2).with_term(1, z(-1)).add(&LinearExpression::constant(z(-2))),
            CompareOperator::Le,
        ); // y - x - 2 <= 0
        d.add_constraint(&y_minus_x);
        let z_minus_y = LinearConstraint::new(
            LinearExpression::var(3).with_term(2, z(-1)).add(&LinearExpression::constant(z(-3))),
            CompareOperator::Le,
        ); // z - y - 3 <= 0
        d.add_constraint(&z_minus_y);
        // The chain x <= 10, y <= x + 2, z <= y + 3 is already incrementally
        // closed by `add_diff_bound` itself, with no intervening unit bound
        // to trigger `relax_through`, so this only passes if the two-variable
        // incremental relaxation actually ran.
        assert_eq!(d.get_bound(3).ub(), &Bound::Finite(z(15)));
    }
}
