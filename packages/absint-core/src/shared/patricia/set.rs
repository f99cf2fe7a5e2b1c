//! Persistent Patricia tree set, built on [`super::map::PatriciaTreeMap`]
//! with a unit value, the set half of spec.md §3's
//! "PatriciaTreeMap/Set" pair.

use super::map::PatriciaTreeMap;

#[derive(Clone, Debug, Default)]
pub struct PatriciaTreeSet {
    map: PatriciaTreeMap<()>,
}

impl PatriciaTreeSet {
    pub fn new() -> Self {
        Self {
            map: PatriciaTreeMap::new(),
        }
    }

    pub fn singleton(key: u32) -> Self {
        Self::new().insert(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn contains(&self, key: u32) -> bool {
        self.map.contains(key)
    }

    pub fn insert(&self, key: u32) -> Self {
        Self {
            map: self.map.insert(key, ()),
        }
    }

    pub fn erase(&self, key: u32) -> Self {
        Self {
            map: self.map.erase(key),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.map.iter().map(|(k, _)| k)
    }

    pub fn join(&self, other: &Self) -> Self {
        Self {
            map: self.map.join(&other.map, |_, _| ()),
        }
    }

    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            map: self.map.intersect(&other.map, |_, _| ()),
        }
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self {
            map: self.map.difference(&other.map),
        }
    }

    pub fn filter(&self, pred: impl Fn(u32) -> bool) -> Self {
        Self {
            map: self.map.filter(|k, _| pred(k)),
        }
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.iter().all(|k| other.contains(k))
    }

    pub fn equals(&self, other: &Self) -> bool {
        self.map.equals(&other.map)
    }

    pub fn from_iter(iter: impl IntoIterator<Item = u32>) -> Self {
        let mut s = Self::new();
        for k in iter {
            s = s.insert(k);
        }
        s
    }
}

impl FromIterator<u32> for PatriciaTreeSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self::from_iter(iter)
    }
}
