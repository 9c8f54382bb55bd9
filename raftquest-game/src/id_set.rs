//! Insertion-ordered identifier set persisted as a plain array.
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

/// Set of ids that remembers insertion order for display purposes.
///
/// Membership is what the game logic cares about; order only matters for
/// rendering lists such as "completed steps". Snapshots store the set as a
/// JSON array. Duplicates are dropped both when writing and when reading so
/// hand-edited or legacy snapshots cannot break the uniqueness invariant.
#[derive(Debug, Clone)]
pub struct IdSet<T: Eq + Hash + Clone> {
    order: Vec<T>,
    index: HashSet<T>,
}

impl<T: Eq + Hash + Clone> Default for IdSet<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            index: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> PartialEq for IdSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T: Eq + Hash + Clone> Eq for IdSet<T> {}

impl<T: Eq + Hash + Clone> IdSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id, returning `false` when it was already present.
    pub fn insert(&mut self, id: T) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Remove an id, returning `true` when it was present.
    pub fn remove<Q>(&mut self, id: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.index.remove(id) {
            return false;
        }
        self.order.retain(|existing| existing.borrow() != id);
        true
    }

    #[must_use]
    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.order.iter()
    }

    /// Keep only the ids matching the predicate, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let index = &mut self.index;
        self.order.retain(|id| {
            let kept = keep(id);
            if !kept {
                index.remove(id);
            }
            kept
        });
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for IdSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for IdSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &'a IdSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

impl<T> Serialize for IdSet<T>
where
    T: Eq + Hash + Clone + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut written: HashSet<&T> = HashSet::with_capacity(self.order.len());
        let mut seq = serializer.serialize_seq(Some(self.order.len()))?;
        for id in &self.order {
            if written.insert(id) {
                seq.serialize_element(id)?;
            }
        }
        seq.end()
    }
}

impl<'de, T> Deserialize<'de> for IdSet<T>
where
    T: Eq + Hash + Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<T>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::StepId;

    #[test]
    fn duplicates_are_dropped_on_load() {
        let set: IdSet<StepId> =
            serde_json::from_str(r#"["a-step-1","a-step-2","a-step-1"]"#).unwrap();
        assert_eq!(set.len(), 2);
        let ids: Vec<&str> = set.iter().map(StepId::as_str).collect();
        assert_eq!(ids, ["a-step-1", "a-step-2"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut set: IdSet<StepId> = ["s1", "s2", "s3"].into_iter().map(StepId::from).collect();
        assert!(set.remove("s2"));
        assert!(!set.remove("s2"));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["s1","s3"]"#);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a: IdSet<StepId> = ["s1", "s2"].into_iter().map(StepId::from).collect();
        let b: IdSet<StepId> = ["s2", "s1"].into_iter().map(StepId::from).collect();
        assert_eq!(a, b);
    }
}
