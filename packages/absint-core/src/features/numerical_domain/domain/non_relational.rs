//! Non-relational abstract store: lifts a value lattice `V` to a map from
//! `VariableId` to `V` (spec.md §4.7). A variable absent from the map is
//! implicitly bound to `V::top()`, the most permissive value, so a store
//! only ever records information about variables it has actually narrowed.
//!
//! This makes `PatriciaTreeMap::intersect` (keep only the keys both sides
//! agree to track, combine their values) exactly the store-level `join`,
//! since a variable unconstrained on either side is unconstrained in the
//! join too. Symmetrically `PatriciaTreeMap::join` (keep the union of keys,
//! combine on overlap) is the store-level `meet`.

use crate::shared::lattice::AbstractDomain;
use crate::shared::models::variable::VariableId;
use crate::shared::patricia::PatriciaTreeMap;
use std::fmt;

/// `Bottom` is kept as an explicit variant rather than some sentinel
/// mapping, since the empty map already means "every variable is top",
/// the store's actual top element.
#[derive(Debug, Clone)]
pub enum NonRelationalDomain<V: AbstractDomain> {
    Bottom,
    Map(PatriciaTreeMap<V>),
}

impl<V: AbstractDomain> NonRelationalDomain<V> {
    /// The value bound to `var`, or `V::top()` if the store doesn't track it.
    /// A bottom store reports every variable as `V::bottom()`: no value is
    /// reachable there at all.
    pub fn get(&self, var: VariableId) -> V {
        match self {
            Self::Bottom => V::bottom(),
            Self::Map(map) => map.get(var).cloned().unwrap_or_else(V::top),
        }
    }

    /// Binds `var` to `value`, dropping the entry entirely when `value` is
    /// top (keeping the map's "missing means top" invariant canonical).
    /// A no-op on an already-bottom store.
    pub fn set(&mut self, var: VariableId, value: V) {
        let map = match self {
            Self::Bottom => return,
            Self::Map(map) => map,
        };
        if value.is_bottom() {
            *self = Self::Bottom;
        } else if value.is_top() {
            *map = map.erase(var);
        } else {
            *map = map.insert(var, value);
        }
    }

    pub fn forget(&mut self, var: VariableId) {
        self.set(var, V::top());
    }
}

impl<V: AbstractDomain> PartialEq for NonRelationalDomain<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bottom, Self::Bottom) => true,
            (Self::Bottom, Self::Map(_)) | (Self::Map(_), Self::Bottom) => false,
            (Self::Map(a), Self::Map(b)) => a.equals(b),
        }
    }
}

impl<V: AbstractDomain> AbstractDomain for NonRelationalDomain<V> {
    fn bottom() -> Self {
        Self::Bottom
    }

    fn top() -> Self {
        Self::Map(PatriciaTreeMap::new())
    }

    fn is_bottom(&self) -> bool {
        matches!(self, Self::Bottom)
    }

    fn is_top(&self) -> bool {
        matches!(self, Self::Map(map) if map.is_empty())
    }

    fn leq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bottom, _) => true,
            (_, Self::Bottom) => self.is_bottom(),
            (Self::Map(a), Self::Map(b)) => a.iter().chain(b.iter()).all(|(k, _)| {
                let av = a.get(k).cloned().unwrap_or_else(V::top);
                let bv = b.get(k).cloned().unwrap_or_else(V::top);
                av.leq(&bv)
            }),
        }
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Map(a), Self::Map(b)) => Self::Map(a.intersect(b, |x, y| x.join(y))),
        }
    }

    fn widening(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Map(a), Self::Map(b)) => Self::Map(a.intersect(b, |x, y| x.widening(y))),
        }
    }

    fn widening_threshold(&self, other: &Self, thresholds: &[i64]) -> Self {
        match (self, other) {
            (Self::Bottom, x) | (x, Self::Bottom) => x.clone(),
            (Self::Map(a), Self::Map(b)) => {
                Self::Map(a.intersect(b, |x, y| x.widening_threshold(y, thresholds)))
            }
        }
    }

    fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        match (self, other) {
            (Self::Map(a), Self::Map(b)) => Self::Map(a.join(b, |x, y| x.meet(y))),
            _ => unreachable!("bottom already handled above"),
        }
    }

    fn narrowing(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::Bottom;
        }
        match (self, other) {
            (Self::Map(a), Self::Map(b)) => Self::Map(a.join(b, |x, y| x.narrowing(y))),
            _ => unreachable!("bottom already handled above"),
        }
    }
}

impl<V: AbstractDomain + fmt::Display> fmt::Display for NonRelationalDomain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bottom => write!(f, "_|_"),
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "v{} -> {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interval::domain::interval::Interval;
    use crate::shared::models::bound::Bound;
    use crate::shared::models::number::ZNumber;

    fn z(n: i64) -> ZNumber {
        ZNumber::from_i64(n)
    }
    fn iv(lo: i64, hi: i64) -> Interval<ZNumber> {
        Interval::new(Bound::Finite(z(lo)), Bound::Finite(z(hi)))
    }

    type Store = NonRelationalDomain<Interval<ZNumber>>;

    #[test]
    fn missing_variable_reads_as_top() {
        let store = Store::top();
        assert!(store.get(1).is_top());
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = Store::top();
        store.set(1, iv(0, 10));
        assert_eq!(store.get(1), iv(0, 10));
        assert!(store.get(2).is_top());
    }

    #[test]
    fn setting_top_forgets_the_variable() {
        let mut store = Store::top();
        store.set(1, iv(0, 10));
        store.set(1, Interval::top());
        assert!(matches!(&store, NonRelationalDomain::Map(m) if m.is_empty()));
    }

    #[test]
    fn setting_bottom_collapses_the_whole_store() {
        let mut store = Store::top();
        store.set(1, iv(0, 10));
        store.set(2, Interval::bottom());
        assert!(store.is_bottom());
    }

    #[test]
    fn join_drops_a_variable_unconstrained_on_either_side() {
        let mut a = Store::top();
        a.set(1, iv(0, 5));
        a.set(2, iv(0, 5));
        let mut b = Store::top();
        b.set(1, iv(3, 8));
        let joined = a.join(&b);
        assert_eq!(joined.get(1), iv(0, 8));
        assert!(joined.get(2).is_top());
    }

    #[test]
    fn meet_keeps_a_variable_constrained_on_only_one_side() {
        let mut a = Store::top();
        a.set(1, iv(0, 5));
        let mut b = Store::top();
        b.set(1, iv(3, 8));
        b.set(2, iv(10, 20));
        let met = a.meet(&b);
        assert_eq!(met.get(1), iv(3, 5));
        assert_eq!(met.get(2), iv(10, 20));
    }

    #[test]
    fn bottom_is_absorbing_for_meet_and_identity_for_join() {
        let mut a = Store::top();
        a.set(1, iv(0, 5));
        assert!(a.meet(&Store::bottom()).is_bottom());
        assert_eq!(a.join(&Store::bottom()), a);
    }
}
