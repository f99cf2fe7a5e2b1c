//! Disjoint-set-union over [`VariableId`]s, path-compressed and unioned by
//! rank. Unlike a points-to node space, variable ids here are not dense
//! from zero, so sets are kept in hash maps rather than index vectors
//! (adapted from the dense-array union-find elsewhere in this codebase).
//!
//! # References
//! - Tarjan, R. E. "Efficiency of a Good But Not Linear Set Union Algorithm" (1975)

use crate::shared::models::variable::VariableId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    parent: FxHashMap<VariableId, VariableId>,
    rank: FxHashMap<VariableId, u8>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// `v`'s representative if `v` has ever been mentioned; `v` is
    /// implicitly its own singleton representative otherwise, and this
    /// does not allocate an entry for it (keeps untouched variables free).
    pub fn find(&mut self, v: VariableId) -> VariableId {
        if !self.parent.contains_key(&v) {
            return v;
        }
        let mut root = v;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        let mut cur = v;
        while cur != root {
            let next = self.parent[&cur];
            self.parent.insert(cur, root);
            cur = next;
        }
        root
    }

    /// Same lookup, without path compression, for read-only contexts
    /// (`leq`) that must not mutate a `&self` structure.
    pub fn find_readonly(&self, v: VariableId) -> VariableId {
        let mut root = v;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        root
    }

    /// Merges the classes of `a` and `b`, returning the surviving root.
    pub fn union(&mut self, a: VariableId, b: VariableId) -> VariableId {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        let rank_a = *self.rank.get(&ra).unwrap_or(&0);
        let rank_b = *self.rank.get(&rb).unwrap_or(&0);
        if rank_a < rank_b {
            self.parent.insert(ra, rb);
            rb
        } else if rank_a > rank_b {
            self.parent.insert(rb, ra);
            ra
        } else {
            self.parent.insert(rb, ra);
            *self.rank.entry(ra).or_insert(0) += 1;
            ra
        }
    }

    /// Detaches `v` from the structure entirely: it reverts to being its
    /// own singleton representative, and nothing else still points at it
    /// (used by `forget` on a non-representative member, spec.md §4.10).
    pub fn detach(&mut self, v: VariableId) {
        self.parent.remove(&v);
        self.rank.remove(&v);
    }

    /// `v`'s direct children in the union-find forest (used to promote a
    /// replacement representative when `v` itself is forgotten).
    pub fn children_of(&self, v: VariableId) -> Vec<VariableId> {
        self.parent.iter().filter(|&(&c, &p)| p == v && c != v).map(|(&c, _)| c).collect()
    }

    /// Repoints every child of `old_root` to `new_root`, making
    /// `new_root` the representative in `old_root`'s place.
    pub fn repoint_children(&mut self, old_root: VariableId, new_root: VariableId) {
        for p in self.parent.values_mut() {
            if *p == old_root {
                *p = new_root;
            }
        }
        self.parent.remove(&old_root);
        if let Some(r) = self.rank.remove(&old_root) {
            self.rank.insert(new_root, r);
        }
    }

    pub fn is_representative(&mut self, v: VariableId) -> bool {
        self.find(v) == v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_variables_are_their_own_singleton_class() {
        let mut uf = UnionFind::new();
        assert_eq!(uf.find(7), 7);
    }

    #[test]
    fn union_merges_two_classes_under_one_representative() {
        let mut uf = UnionFind::new();
        let rep = uf.union(1, 2);
        assert_eq!(uf.find(1), rep);
        assert_eq!(uf.find(2), rep);
    }

    #[test]
    fn path_compression_flattens_a_chain() {
        let mut uf = UnionFind::new();
        uf.union(1, 2);
        uf.union(2, 3);
        uf.union(3, 4);
        let root = uf.find(1);
        assert_eq!(uf.find(4), root);
        assert_eq!(uf.find(2), root);
    }

    #[test]
    fn detaching_a_non_representative_member_makes_it_a_singleton_again() {
        let mut uf = UnionFind::new();
        let rep = uf.union(1, 2);
        let member = if rep == 1 { 2 } else { 1 };
        uf.detach(member);
        assert_eq!(uf.find(member), member);
        assert_eq!(uf.find(rep), rep);
    }
}
