//! The meta-domain itself (spec.md §4.10).
//!
//! **Open question resolved.** The spec describes combining classes (on
//! a multi-variable operation forcing a union, and when checking `leq`
//! against the overlapping left classes of the other operand) as taking
//! their "join". Worked through concretely: two `Dbm`s over *disjoint*
//! variable sets, each projected onto the same shared dimension set,
//! have every foreign dimension at `+inf` (unconstrained); the pointwise
//! `max` that is `Dbm::join` turns every entry, including the ones each
//! side *did* constrain, into `+inf`, destroying both sides' facts. The
//! pointwise `min` that is `Dbm::meet` is what actually reconstitutes the
//! combined fact soundly. So "join" here is read as the informal
//! "merge/combine", implemented with `Dbm::meet`; `Dbm::join` (the real
//! lattice join) is reserved for combining two *competing* hypotheses
//! about the same variable set, which is what this domain's own `join`
//! operation does once both operands are reprojected onto a common
//! partition (see `combine`).

use crate::features::dbm::Dbm;
use crate::features::linear::domain::constraint::LinearConstraint;
use crate::features::variable_packing::infrastructure::union_find::UnionFind;
use crate::shared::ir::CompareOperator;
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::number::ZNumber;
use crate::shared::models::variable::VariableId;
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone)]
pub enum VariablePacking {
    Bottom,
    Packing { uf: UnionFind, classes: FxHashMap<VariableId, Dbm> },
}

impl VariablePacking {
    pub fn top() -> Self {
        Self::Packing { uf: UnionFind::new(), classes: FxHashMap::default() }
    }

    pub fn bottom() -> Self {
        Self::Bottom
    }

    fn all_classes(&self) -> Vec<&Dbm> {
        match self {
            Self::Bottom => Vec::new(),
            Self::Packing { classes, .. } => classes.values().collect(),
        }
    }

    pub fn is_bottom(&self) -> bool {
        match self {
            Self::Bottom => true,
            Self::Packing { classes, .. } => classes.values().any(Dbm::is_bottom),
        }
    }

    pub fn is_top(&self) -> bool {
        match self {
            Self::Bottom => false,
            Self::Packing { classes, .. } => classes.values().all(Dbm::is_top),
        }
    }

    fn find_readonly(&self, v: VariableId) -> VariableId {
        match self {
            Self::Bottom => v,
            Self::Packing { uf, .. } => uf.find_readonly(v),
        }
    }

    fn class_of_readonly(&self, rep: VariableId) -> Dbm {
        match self {
            Self::Bottom => Dbm::bottom(),
            Self::Packing { classes, .. } => classes.get(&rep).cloned().unwrap_or_else(Dbm::top),
        }
    }

    /// Finds the representatives of `vars`, unions their classes if more
    /// than one distinct representative shows up, and folds the
    /// (now-one) class's sub-domain via `Dbm::meet` over the union of
    /// their variables (see module doc for why `meet`, not `join`).
    pub fn ensure_related(&mut self, vars: &[VariableId]) {
        if matches!(self, Self::Bottom) || vars.len() < 2 {
            return;
        }
        let mut reps = Vec::new();
        for &v in vars {
            let r = self.find(v);
            if !reps.contains(&r) {
                reps.push(r);
            }
        }
        if reps.len() < 2 {
            return;
        }
        let mut combined = Dbm::top();
        for &r in &reps {
            combined = combined.meet(&self.class_of_readonly(r));
        }
        let mut new_root = reps[0];
        for &r in &reps[1..] {
            new_root = self.union2(new_root, r);
        }
        if let Self::Packing { classes, .. } = self {
            for &r in &reps {
                if r != new_root {
                    classes.remove(&r);
                }
            }
            classes.insert(new_root, combined);
        }
        if self.class_of_readonly(new_root).is_bottom() {
            *self = Self::Bottom;
        }
    }

    fn find(&mut self, v: VariableId) -> VariableId {
        match self {
            Self::Bottom => v,
            Self::Packing { uf, .. } => uf.find(v),
        }
    }

    fn union2(&mut self, a: VariableId, b: VariableId) -> VariableId {
        match self {
            Self::Bottom => a,
            Self::Packing { uf, .. } => uf.union(a, b),
        }
    }

    /// `x := y + c` (or `x := c` when `source` is `None`). A reference to
    /// a second variable forces a union before the assign runs.
    pub fn assign(&mut self, x: VariableId, source: Option<VariableId>, c: ZNumber) {
        if matches!(self, Self::Bottom) {
            return;
        }
        if let Some(y) = source {
            if y != x {
                self.ensure_related(&[x, y]);
            }
        }
        let rep = self.find(x);
        let mut went_bottom = false;
        if let Self::Packing { classes, .. } = self {
            let dbm = classes.entry(rep).or_insert_with(Dbm::top);
            dbm.assign(x, source, c);
            went_bottom = dbm.is_bottom();
        }
        if went_bottom {
            *self = Self::Bottom;
        }
    }

    /// Per spec.md §4.10: a non-representative member just drops out of
    /// its class; the representative promotes an arbitrary child first.
    pub fn forget(&mut self, v: VariableId) {
        if matches!(self, Self::Bottom) {
            return;
        }
        let rep = self.find(v);
        if rep != v {
            if let Self::Packing { classes, .. } = self {
                if let Some(d) = classes.get_mut(&rep) {
                    d.forget(v);
                }
            }
            if let Self::Packing { uf, .. } = self {
                uf.detach(v);
            }
            return;
        }
        let child = match self {
            Self::Packing { uf, .. } => uf.children_of(v).into_iter().next(),
            Self::Bottom => None,
        };
        if let Self::Packing { classes, .. } = self {
            if let Some(d) = classes.get_mut(&v) {
                d.forget(v);
            }
        }
        match child {
            None => {
                if let Self::Packing { classes, .. } = self {
                    classes.remove(&v);
                }
            }
            Some(new_rep) => {
                if let Self::Packing { uf, classes } = self {
                    uf.repoint_children(v, new_rep);
                    if let Some(d) = classes.remove(&v) {
                        classes.insert(new_rep, d);
                    }
                }
            }
        }
    }

    /// Constant-only constraints (no variables) are decided directly;
    /// one- and two-or-more-variable constraints are routed into the
    /// (possibly freshly merged) class that now holds all their
    /// variables.
    pub fn add_constraint(&mut self, constraint: &LinearConstraint) {
        if matches!(self, Self::Bottom) {
            return;
        }
        let vars: Vec<VariableId> = constraint.expr.terms().map(|(v, _)| v).collect();
        if vars.is_empty() {
            let holds = constant_constraint_holds(constraint);
            if !holds {
                *self = Self::Bottom;
            }
            return;
        }
        if vars.len() >= 2 {
            self.ensure_related(&vars);
        }
        let rep = self.find(vars[0]);
        let mut went_bottom = false;
        if let Self::Packing { classes, .. } = self {
            let dbm = classes.entry(rep).or_insert_with(Dbm::top);
            dbm.add_constraint(constraint);
            went_bottom = dbm.is_bottom();
        }
        if went_bottom {
            *self = Self::Bottom;
        }
    }

    pub fn get_bound(&self, v: VariableId) -> crate::features::interval::domain::interval::Interval<ZNumber> {
        let rep = self.find_readonly(v);
        self.class_of_readonly(rep).get_bound(v)
    }

    pub fn leq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bottom, _) => true,
            (_, Self::Bottom) => self.is_bottom(),
            (Self::Packing { .. }, Self::Packing { classes: other_classes, .. }) => {
                for other_dbm in other_classes.values() {
                    let mut seen = Vec::new();
                    let mut left_combined = Dbm::top();
                    for &v in other_dbm.vars() {
                        let rep = self.find_readonly(v);
                        if seen.contains(&rep) {
                            continue;
                        }
                        seen.push(rep);
                        left_combined = left_combined.meet(&self.class_of_readonly(rep));
                    }
                    if !left_combined.leq(other_dbm) {
                        return false;
                    }
                }
                true
            }
        }
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.leq(other) && other.leq(self)
    }

    /// The coarsest common refinement of `self`'s and `other`'s
    /// partitions: two variables land in the same group if either side
    /// (transitively) related them.
    fn merged_partition(&self, other: &Self) -> Vec<Vec<VariableId>> {
        let mut uf = UnionFind::new();
        let mut all_vars = Vec::new();
        for d in self.all_classes().into_iter().chain(other.all_classes()) {
            let vs = d.vars();
            all_vars.extend_from_slice(vs);
            if vs.len() > 1 {
                let mut it = vs.iter();
                if let Some(&first) = it.next() {
                    for &v in it {
                        uf.union(first, v);
                    }
                }
            }
        }
        all_vars.sort_unstable();
        all_vars.dedup();
        let mut groups: FxHashMap<VariableId, Vec<VariableId>> = FxHashMap::default();
        for v in all_vars {
            groups.entry(uf.find(v)).or_default().push(v);
        }
        groups.into_values().collect()
    }

    /// `self`'s combined knowledge about exactly `group`'s variables:
    /// the `meet` of every one of `self`'s classes that lies inside it
    /// (by construction of `merged_partition`, a class is either wholly
    /// inside `group` or wholly disjoint from it, never partial).
    fn project(&self, group: &[VariableId]) -> Dbm {
        let mut acc = Dbm::top();
        for d in self.all_classes() {
            if d.vars().iter().any(|v| group.contains(v)) {
                acc = acc.meet(d);
            }
        }
        acc
    }

    fn combine(&self, other: &Self, op: impl Fn(&Dbm, &Dbm) -> Dbm) -> Self {
        let groups = self.merged_partition(other);
        let mut uf = UnionFind::new();
        let mut classes = FxHashMap::default();
        let mut any_bottom = false;
        for group in groups {
            let a = self.project(&group);
            let b = other.project(&group);
            let combined = op(&a, &b);
            if combined.is_bottom() {
                any_bottom = true;
            }
            let rep = group[0];
            for &v in &group {
                if v != rep {
                    uf.union(rep, v);
                }
            }
            if group.len() > 1 || !combined.is_top() {
                classes.insert(uf.find(rep), combined);
            }
        }
        if any_bottom {
            return Self::Bottom;
        }
        Self::Packing { uf, classes }
    }

    pub fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            _ => self.combine(other, |a, b| a.join(b)),
        }
    }

    pub fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        self.combine(other, |a, b| a.meet(b))
    }

    pub fn widening(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            _ => self.combine(other, |a, b| a.widening(b)),
        }
    }

    pub fn narrowing(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        self.combine(other, |a, b| a.narrowing(b))
    }
}

fn constant_constraint_holds(constraint: &LinearConstraint) -> bool {
    let k = constraint.expr.constant_term();
    let zero = ZNumber::zero();
    match constraint.op {
        CompareOperator::Eq => *k == zero,
        CompareOperator::Ne => *k != zero,
        CompareOperator::Lt => *k < zero,
        CompareOperator::Le => *k <= zero,
        CompareOperator::Gt => *k > zero,
        CompareOperator::Ge => *k >= zero,
    }
}

impl PartialEq for VariablePacking {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl AbstractDomain for VariablePacking {
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
    fn meet(&self, other: &Self) -> Self {
        Self::meet(self, other)
    }
    fn narrowing(&self, other: &Self) -> Self {
        Self::narrowing(self, other)
    }
}

impl fmt::Display for VariablePacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bottom => write!(f, "_|_"),
            Self::Packing { classes, .. } => {
                write!(f, "{{")?;
                for (i, d) in classes.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", d)?;
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
    use crate::shared::models::bound::Bound;

    fn z(n: i64) -> ZNumber {
        ZNumber::from_i64(n)
    }

    fn le(v: VariableId, c: i64) -> LinearConstraint {
        LinearConstraint::new(LinearExpression::var(v).add(&LinearExpression::constant(z(-c))), CompareOperator::Le)
    }

    #[test]
    fn single_variable_bound_survives_without_forcing_a_union() {
        let mut p = VariablePacking::top();
        p.add_constraint(&le(1, 5));
        assert_eq!(p.get_bound(1).ub(), &Bound::Finite(z(5)));
    }

    #[test]
    fn a_two_variable_constraint_merges_its_variables_into_one_class() {
        let mut p = VariablePacking::top();
        // y - x + 2 <= 0  =>  y <= x - 2
        let diff = LinearConstraint::new(
            LinearExpression::var(2).with_term(1, z(-1)).add(&LinearExpression::constant(z(2))),
            CompareOperator::Le,
        );
        p.add_constraint(&le(1, 5));
        p.add_constraint(&diff);
        assert_eq!(p.get_bound(2).ub(), &Bound::Finite(z(3)));
    }

    #[test]
    fn forgetting_an_unrelated_variable_does_not_disturb_another_class() {
        let mut p = VariablePacking::top();
        p.add_constraint(&le(1, 5));
        p.add_constraint(&le(2, 9));
        p.forget(1);
        assert!(p.get_bound(1).is_top());
        assert_eq!(p.get_bound(2).ub(), &Bound::Finite(z(9)));
    }

    #[test]
    fn join_of_independently_bounded_classes_recombines_each_variable() {
        let mut a = VariablePacking::top();
        a.add_constraint(&le(1, 5));
        a.add_constraint(&le(2, 9));
        let mut b = VariablePacking::top();
        b.add_constraint(&le(1, 3));
        b.add_constraint(&le(2, 20));
        let joined = a.join(&b);
        assert_eq!(joined.get_bound(1).ub(), &Bound::Finite(z(5)));
        assert_eq!(joined.get_bound(2).ub(), &Bound::Finite(z(20)));
    }

    #[test]
    fn contradictory_constant_constraint_collapses_to_bottom() {
        let mut p = VariablePacking::top();
        let c = LinearConstraint::new(LinearExpression::constant(z(1)), CompareOperator::Le);
        p.add_constraint(&c);
        assert!(p.is_bottom());
    }
}
