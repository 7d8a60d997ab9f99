use crate::entry::Entry;
use crate::treap::persistent::{Treap, TreapIter};
use log::trace;
use rand::{Rng, SeedableRng, XorShiftRng};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;

/// A persistent ordered map implemented by a treap.
///
/// The treap stores `Entry<K, V>` values compared by key alone. Every inserted entry is given a
/// priority drawn from a `XorShiftRng` owned by the map.
///
/// Cloning a `TreapMap<K, V>` is `O(1)` and produces an independent version that shares all of
/// its nodes with the original until either one is modified.
///
/// # Examples
///
/// ```
/// use persistent_treap::treap::TreapMap;
///
/// let mut m = TreapMap::new();
/// m.insert(0, 1);
/// m.insert(3, 4);
///
/// assert_eq!(m.get(&0), Some(&1));
/// assert_eq!(m.get(&1), None);
/// assert_eq!(m.len(), 2);
///
/// assert_eq!(m.min(), Some(&0));
/// assert_eq!(m.ceil(&2), Some(&3));
///
/// assert_eq!(m.remove(&0), Some(1));
/// assert_eq!(m.remove(&1), None);
/// ```
pub struct TreapMap<K, V> {
    tree: Treap<Entry<K, V>>,
    rng: XorShiftRng,
}

impl<K, V> TreapMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    /// Constructs a new, empty `TreapMap<K, V>` with a fixed seed for its priorities. Every map
    /// built with `new` draws the same priority sequence; use `with_seed` or `from_rng` for
    /// independent maps.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let m: TreapMap<u32, u32> = TreapMap::new();
    /// ```
    pub fn new() -> Self {
        TreapMap {
            tree: Treap::new(),
            rng: XorShiftRng::new_unseeded(),
        }
    }

    /// Constructs a new, empty `TreapMap<K, V>` whose priorities are drawn from a generator
    /// seeded with `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `seed` is all zeroes.
    pub fn with_seed(seed: [u32; 4]) -> Self {
        TreapMap {
            tree: Treap::new(),
            rng: XorShiftRng::from_seed(seed),
        }
    }

    /// Constructs a new, empty `TreapMap<K, V>` whose generator is seeded from `rng`.
    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        TreapMap {
            tree: Treap::new(),
            rng: rng.gen(),
        }
    }

    /// Returns the underlying version of the treap.
    pub fn as_treap(&self) -> &Treap<Entry<K, V>> {
        &self.tree
    }

    fn get_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        self.tree.find_by(|entry| entry.key.cmp(key))
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, its value is
    /// replaced and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let mut m = TreapMap::new();
    /// assert_eq!(m.insert(1, 1), None);
    /// assert_eq!(m.get(&1), Some(&1));
    /// assert_eq!(m.insert(1, 2), Some(1));
    /// assert_eq!(m.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.get(&key).cloned();
        let priority = self.rng.next_u32();
        self.tree = self.tree.insert(Entry::new(key, value), priority, Entry::cmp);
        previous
    }

    /// Removes a key from the map. Returns the value that was associated with the key, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let mut m = TreapMap::new();
    /// m.insert(1, 1);
    /// assert_eq!(m.remove(&1), Some(1));
    /// assert_eq!(m.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (less, equal, greater) = self.tree.split_by(|entry| entry.key.cmp(key));
        let removed = equal.root().map(|entry| entry.value.clone());
        if removed.is_some() {
            self.tree = less.join(&greater);
        }
        removed
    }

    /// Checks if a key exists in the map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_entry(key).is_some()
    }

    /// Returns an immutable reference to the value associated with a particular key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_entry(key).map(|entry| &entry.value)
    }

    /// Returns the greatest key in the map that is less than or equal to `key`.
    pub fn floor(&self, key: &K) -> Option<&K> {
        self.tree
            .floor_by(|entry| entry.key.cmp(key))
            .map(|entry| &entry.key)
    }

    /// Returns the least key in the map that is greater than or equal to `key`.
    pub fn ceil(&self, key: &K) -> Option<&K> {
        self.tree
            .ceil_by(|entry| entry.key.cmp(key))
            .map(|entry| &entry.key)
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    pub fn min(&self) -> Option<&K> {
        self.tree.min().map(|entry| &entry.key)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    pub fn max(&self) -> Option<&K> {
        self.tree.max().map(|entry| &entry.key)
    }

    fn derive(&self, tree: Treap<Entry<K, V>>) -> Self {
        TreapMap {
            tree,
            rng: self.rng.clone().gen(),
        }
    }

    /// Returns the union of two maps. If a key is present in both maps, the value from `self` is
    /// kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let n: TreapMap<u32, char> = vec![(1, 'a'), (2, 'a')].into_iter().collect();
    /// let m: TreapMap<u32, char> = vec![(2, 'b'), (3, 'b')].into_iter().collect();
    ///
    /// let union = n.union(&m);
    /// assert_eq!(
    ///     union.iter().collect::<Vec<(&u32, &char)>>(),
    ///     vec![(&1, &'a'), (&2, &'a'), (&3, &'b')],
    /// );
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        self.merge(other, false)
    }

    /// Returns the union of two maps. If a key is present in both maps, the value from `other`
    /// is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let n: TreapMap<u32, char> = vec![(1, 'a'), (2, 'a')].into_iter().collect();
    /// let m: TreapMap<u32, char> = vec![(2, 'b'), (3, 'b')].into_iter().collect();
    ///
    /// let union = n.union_with_overwrite(&m);
    /// assert_eq!(union.get(&2), Some(&'b'));
    /// ```
    pub fn union_with_overwrite(&self, other: &Self) -> Self {
        self.merge(other, true)
    }

    fn merge(&self, other: &Self, overwrite: bool) -> Self {
        let tree = self.tree.union(&other.tree, Entry::cmp, overwrite);
        trace!(
            "union of maps with {} and {} entries has {} entries (overwrite: {})",
            self.len(),
            other.len(),
            tree.len(),
            overwrite,
        );
        self.derive(tree)
    }

    /// Returns the entries of `self` whose keys are also in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let n: TreapMap<u32, char> = vec![(1, 'a'), (2, 'a')].into_iter().collect();
    /// let m: TreapMap<u32, char> = vec![(2, 'b'), (3, 'b')].into_iter().collect();
    ///
    /// let inter = n.intersection(&m);
    /// assert_eq!(inter.iter().collect::<Vec<(&u32, &char)>>(), vec![(&2, &'a')]);
    /// ```
    pub fn intersection(&self, other: &Self) -> Self {
        let tree = self.tree.intersection(&other.tree, Entry::cmp);
        trace!(
            "intersection of maps with {} and {} entries has {} entries",
            self.len(),
            other.len(),
            tree.len(),
        );
        self.derive(tree)
    }

    /// Returns the entries of `self` whose keys are not in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let n: TreapMap<u32, char> = vec![(1, 'a'), (2, 'a')].into_iter().collect();
    /// let m: TreapMap<u32, char> = vec![(2, 'b'), (3, 'b')].into_iter().collect();
    ///
    /// let difference = n.difference(&m);
    /// assert_eq!(difference.iter().collect::<Vec<(&u32, &char)>>(), vec![(&1, &'a')]);
    /// ```
    pub fn difference(&self, other: &Self) -> Self {
        let tree = self.tree.diff(&other.tree, Entry::cmp);
        trace!(
            "difference of maps with {} and {} entries has {} entries",
            self.len(),
            other.len(),
            tree.len(),
        );
        self.derive(tree)
    }
}

impl<K, V> TreapMap<K, V> {
    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapMap;
    ///
    /// let mut m = TreapMap::new();
    /// m.insert(1, 1);
    /// m.insert(3, 3);
    ///
    /// let mut iterator = m.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&3, &3)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> TreapMapIter<'_, K, V> {
        TreapMapIter {
            iter: self.tree.iter(),
        }
    }

    /// Returns an iterator over the keys of the map in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values of the map in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<'a, K: 'a, V: 'a> IntoIterator for &'a TreapMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = TreapMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `TreapMap<K, V>`
///
/// This iterator traverses the elements of a map in-order and yields immutable references.
pub struct TreapMapIter<'a, K: 'a, V: 'a> {
    iter: TreapIter<'a, Entry<K, V>>,
}

impl<'a, K: 'a, V: 'a> Iterator for TreapMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for TreapMapIter<'a, K, V> {}

impl<K: Ord + Clone, V: Clone> Default for TreapMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for TreapMap<K, V> {
    fn clone(&self) -> Self {
        TreapMap {
            tree: self.tree.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TreapMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for TreapMap<K, V> {
    fn eq(&self, other: &TreapMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for TreapMap<K, V> {}

impl<K: Ord + Clone, V: Clone> Extend<(K, V)> for TreapMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for TreapMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TreapMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Serialize, V: Serialize> Serialize for TreapMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de, K, V> Deserialize<'de> for TreapMap<K, V>
where
    K: Deserialize<'de> + Ord + Clone,
    V: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TreapMapVisitor {
            marker: PhantomData,
        })
    }
}

struct TreapMapVisitor<K, V> {
    marker: PhantomData<(K, V)>,
}

impl<'de, K, V> Visitor<'de> for TreapMapVisitor<K, V>
where
    K: Deserialize<'de> + Ord + Clone,
    V: Deserialize<'de> + Clone,
{
    type Value = TreapMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = TreapMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}
