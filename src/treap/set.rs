use crate::treap::persistent::{Treap, TreapIter};
use log::trace;
use rand::{Rng, SeedableRng, XorShiftRng};
use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::ops::{Add, BitAnd, Sub};

/// A persistent ordered set implemented by a treap.
///
/// Every inserted value is given a priority drawn from a `XorShiftRng` owned by the set, so the
/// expected height of the treap is proportional to the logarithm of the number of values.
///
/// Cloning a `TreapSet<T>` is `O(1)` and produces an independent version: later insertions and
/// removals on either copy never affect the other. Unions, intersections, and differences take
/// both operands by reference and share every subtree they do not need to rebuild.
///
/// # Examples
///
/// ```
/// use persistent_treap::treap::TreapSet;
///
/// let mut s = TreapSet::new();
/// s.insert(0);
/// s.insert(3);
///
/// let snapshot = s.clone();
/// assert_eq!(s.remove(&0), Some(0));
///
/// assert_eq!(s.len(), 1);
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(snapshot.ceil(&2), Some(&3));
/// ```
pub struct TreapSet<T> {
    tree: Treap<T>,
    rng: XorShiftRng,
}

impl<T: Ord + Clone> TreapSet<T> {
    /// Constructs a new, empty `TreapSet<T>`. Priorities are drawn from a generator with a fixed
    /// seed, so the shape of the treap is reproducible. Every set built with `new` draws the same
    /// priority sequence; use `with_seed` or `from_rng` for independent sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let s: TreapSet<u32> = TreapSet::new();
    /// ```
    pub fn new() -> Self {
        TreapSet {
            tree: Treap::new(),
            rng: XorShiftRng::new_unseeded(),
        }
    }

    /// Constructs a new, empty `TreapSet<T>` whose priorities are drawn from a generator seeded
    /// with `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `seed` is all zeroes.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let mut s = TreapSet::with_seed([1, 2, 3, 4]);
    /// s.insert(1);
    /// ```
    pub fn with_seed(seed: [u32; 4]) -> Self {
        TreapSet {
            tree: Treap::new(),
            rng: XorShiftRng::from_seed(seed),
        }
    }

    /// Constructs a new, empty `TreapSet<T>` whose generator is seeded from `rng`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let mut s = TreapSet::from_rng(&mut rand::thread_rng());
    /// s.insert(1);
    /// ```
    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        TreapSet {
            tree: Treap::new(),
            rng: rng.gen(),
        }
    }

    /// Returns the underlying version of the treap.
    pub fn as_treap(&self) -> &Treap<T> {
        &self.tree
    }

    /// Inserts a value into the set. If an equal value already exists in the set, it will be
    /// replaced and returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let mut s = TreapSet::new();
    /// assert_eq!(s.insert(1), None);
    /// assert_eq!(s.contains(&1), true);
    /// assert_eq!(s.insert(1), Some(1));
    /// ```
    pub fn insert(&mut self, value: T) -> Option<T> {
        let previous = self.tree.find(&value, T::cmp).cloned();
        let priority = self.rng.next_u32();
        self.tree = self.tree.insert(value, priority, T::cmp);
        previous
    }

    /// Removes a value from the set. Returns the removed value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let mut s = TreapSet::new();
    /// s.insert(1);
    /// assert_eq!(s.remove(&1), Some(1));
    /// assert_eq!(s.remove(&1), None);
    /// ```
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let (less, equal, greater) = self.tree.split(value, T::cmp);
        let removed = equal.root().cloned();
        if removed.is_some() {
            self.tree = less.join(&greater);
        }
        removed
    }

    /// Checks if a value exists in the set.
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value, T::cmp)
    }

    /// Returns the greatest value in the set that is less than or equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let mut s = TreapSet::new();
    /// s.insert(1);
    /// assert_eq!(s.floor(&0), None);
    /// assert_eq!(s.floor(&2), Some(&1));
    /// ```
    pub fn floor(&self, value: &T) -> Option<&T> {
        self.tree.floor(value, T::cmp)
    }

    /// Returns the least value in the set that is greater than or equal to `value`.
    pub fn ceil(&self, value: &T) -> Option<&T> {
        self.tree.ceil(value, T::cmp)
    }

    /// Returns the minimum value of the set. Returns `None` if the set is empty.
    pub fn min(&self) -> Option<&T> {
        self.tree.min()
    }

    /// Returns the maximum value of the set. Returns `None` if the set is empty.
    pub fn max(&self) -> Option<&T> {
        self.tree.max()
    }

    fn derive(&self, tree: Treap<T>) -> Self {
        TreapSet {
            tree,
            rng: self.rng.clone().gen(),
        }
    }

    /// Returns the union of two sets. The `+` operator is implemented to take the union of two
    /// sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let n: TreapSet<u32> = vec![1, 2].into_iter().collect();
    /// let m: TreapSet<u32> = vec![2, 3].into_iter().collect();
    ///
    /// let union = n.union(&m);
    /// assert_eq!(union.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3]);
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        let tree = self.tree.union(&other.tree, T::cmp, false);
        trace!(
            "union of sets with {} and {} values has {} values",
            self.len(),
            other.len(),
            tree.len(),
        );
        self.derive(tree)
    }

    /// Returns the intersection of two sets. The `&` operator is implemented to take the
    /// intersection of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let n: TreapSet<u32> = vec![1, 2].into_iter().collect();
    /// let m: TreapSet<u32> = vec![2, 3].into_iter().collect();
    ///
    /// let inter = n.intersection(&m);
    /// assert_eq!(inter.iter().collect::<Vec<&u32>>(), vec![&2]);
    /// ```
    pub fn intersection(&self, other: &Self) -> Self {
        let tree = self.tree.intersection(&other.tree, T::cmp);
        trace!(
            "intersection of sets with {} and {} values has {} values",
            self.len(),
            other.len(),
            tree.len(),
        );
        self.derive(tree)
    }

    /// Returns the values of `self` that are not in `other`. The `-` operator is implemented to
    /// take the difference of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let n: TreapSet<u32> = vec![1, 2].into_iter().collect();
    /// let m: TreapSet<u32> = vec![2, 3].into_iter().collect();
    ///
    /// let difference = n.difference(&m);
    /// assert_eq!(difference.iter().collect::<Vec<&u32>>(), vec![&1]);
    /// ```
    pub fn difference(&self, other: &Self) -> Self {
        let tree = self.tree.diff(&other.tree, T::cmp);
        trace!(
            "difference of sets with {} and {} values has {} values",
            self.len(),
            other.len(),
            tree.len(),
        );
        self.derive(tree)
    }
}

impl<T> TreapSet<T> {
    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns an iterator over the set. The iterator will yield values using in-order traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::TreapSet;
    ///
    /// let mut s = TreapSet::new();
    /// s.insert(1);
    /// s.insert(3);
    ///
    /// let mut iterator = s.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> TreapSetIter<'_, T> {
        TreapSetIter {
            iter: self.tree.iter(),
        }
    }
}

impl<'a, T: 'a> IntoIterator for &'a TreapSet<T> {
    type Item = &'a T;
    type IntoIter = TreapSetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `TreapSet<T>`
///
/// This iterator traverses the elements of a set in-order and yields immutable references.
pub struct TreapSetIter<'a, T: 'a> {
    iter: TreapIter<'a, T>,
}

impl<'a, T: 'a> Iterator for TreapSetIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, T: 'a> ExactSizeIterator for TreapSetIter<'a, T> {}

impl<T: Ord + Clone> Default for TreapSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for TreapSet<T> {
    fn clone(&self) -> Self {
        TreapSet {
            tree: self.tree.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TreapSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for TreapSet<T> {
    fn eq(&self, other: &TreapSet<T>) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq> Eq for TreapSet<T> {}

impl<T: Ord + Clone> Extend<T> for TreapSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord + Clone> FromIterator<T> for TreapSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = TreapSet::new();
        set.extend(iter);
        set
    }
}

impl<'a, 'b, T: Ord + Clone> Add<&'b TreapSet<T>> for &'a TreapSet<T> {
    type Output = TreapSet<T>;

    fn add(self, other: &'b TreapSet<T>) -> TreapSet<T> {
        self.union(other)
    }
}

impl<'a, 'b, T: Ord + Clone> BitAnd<&'b TreapSet<T>> for &'a TreapSet<T> {
    type Output = TreapSet<T>;

    fn bitand(self, other: &'b TreapSet<T>) -> TreapSet<T> {
        self.intersection(other)
    }
}

impl<'a, 'b, T: Ord + Clone> Sub<&'b TreapSet<T>> for &'a TreapSet<T> {
    type Output = TreapSet<T>;

    fn sub(self, other: &'b TreapSet<T>) -> TreapSet<T> {
        self.difference(other)
    }
}

impl<T: Serialize> Serialize for TreapSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T> Deserialize<'de> for TreapSet<T>
where
    T: Deserialize<'de> + Ord + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(TreapSetVisitor {
            marker: PhantomData,
        })
    }
}

struct TreapSetVisitor<T> {
    marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for TreapSetVisitor<T>
where
    T: Deserialize<'de> + Ord + Clone,
{
    type Value = TreapSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = TreapSet::new();
        while let Some(value) = seq.next_element()? {
            set.insert(value);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::TreapSet;
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_len_empty() {
        let set: TreapSet<u32> = TreapSet::new();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let set: TreapSet<u32> = TreapSet::new();
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
    }

    #[test]
    fn test_insert() {
        let mut set = TreapSet::new();
        set.insert(1);
        assert!(set.contains(&1));
    }

    #[test]
    fn test_insert_replace() {
        let mut set = TreapSet::new();
        let ret_1 = set.insert(1);
        let ret_2 = set.insert(1);
        assert_eq!(ret_1, None);
        assert_eq!(ret_2, Some(1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut set = TreapSet::new();
        set.insert(1);
        let ret = set.remove(&1);
        assert!(!set.contains(&1));
        assert_eq!(ret, Some(1));
    }

    #[test]
    fn test_remove_absent_keeps_version() {
        let mut set = TreapSet::new();
        set.insert(1);
        set.insert(3);
        let before = set.clone();
        assert_eq!(set.remove(&2), None);
        assert!(set.as_treap().ptr_eq(before.as_treap()));
    }

    #[test]
    fn test_min_max() {
        let mut set = TreapSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.min(), Some(&1));
        assert_eq!(set.max(), Some(&5));
    }

    #[test]
    fn test_floor_ceil() {
        let mut set = TreapSet::new();
        set.insert(1);
        set.insert(3);
        set.insert(5);

        assert_eq!(set.floor(&0), None);
        assert_eq!(set.floor(&2), Some(&1));
        assert_eq!(set.floor(&4), Some(&3));
        assert_eq!(set.floor(&6), Some(&5));

        assert_eq!(set.ceil(&0), Some(&1));
        assert_eq!(set.ceil(&2), Some(&3));
        assert_eq!(set.ceil(&4), Some(&5));
        assert_eq!(set.ceil(&6), None);
    }

    #[test]
    fn test_snapshot() {
        let mut set = TreapSet::new();
        set.insert(1);
        set.insert(2);
        let snapshot = set.clone();
        set.insert(3);
        set.remove(&1);

        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&2, &3]);
        assert_eq!(snapshot.iter().collect::<Vec<&u32>>(), vec![&1, &2]);
    }

    #[test]
    fn test_derived_set_draws_new_priorities() {
        let mut n = TreapSet::with_seed([1, 2, 3, 4]);
        let mut m = n.union(&TreapSet::new());
        n.insert(1);
        m.insert(1);
        assert_eq!(n, m);
        assert_ne!(n.as_treap().priority(), m.as_treap().priority());
    }

    #[test]
    fn test_union() {
        let n: TreapSet<u32> = vec![1, 2, 3].into_iter().collect();
        let m: TreapSet<u32> = vec![3, 4, 5].into_iter().collect();

        let union = &n + &m;

        assert_eq!(
            union.iter().collect::<Vec<&u32>>(),
            vec![&1, &2, &3, &4, &5],
        );
        assert_eq!(union.len(), 5);
        assert_eq!(n.len(), 3);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_intersection() {
        let n: TreapSet<u32> = vec![1, 2, 3].into_iter().collect();
        let m: TreapSet<u32> = vec![3, 4, 5].into_iter().collect();

        let inter = &n & &m;

        assert_eq!(inter.iter().collect::<Vec<&u32>>(), vec![&3]);
        assert_eq!(inter.len(), 1);
    }

    #[test]
    fn test_difference() {
        let n: TreapSet<u32> = vec![1, 2, 3].into_iter().collect();
        let m: TreapSet<u32> = vec![3, 4, 5].into_iter().collect();

        let sub = &n - &m;

        assert_eq!(sub.iter().collect::<Vec<&u32>>(), vec![&1, &2]);
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn test_seeded_sets_agree() {
        let mut n = TreapSet::with_seed([1, 2, 3, 4]);
        let mut m = TreapSet::with_seed([4, 3, 2, 1]);
        for value in 0..100 {
            n.insert(value);
            m.insert(99 - value);
        }
        assert_eq!(n, m);
        assert_eq!(n.as_treap().validate(u32::cmp), Ok(()));
        assert_eq!(m.as_treap().validate(u32::cmp), Ok(()));
    }

    #[test]
    fn test_iter() {
        let mut set = TreapSet::new();
        set.insert(1);
        set.insert(5);
        set.insert(3);

        assert_eq!(set.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
    }

    #[test]
    fn test_debug() {
        let set: TreapSet<u32> = vec![3, 1, 2].into_iter().collect();
        assert_eq!(format!("{:?}", set), "{1, 2, 3}");
    }

    #[test]
    fn test_serde_tokens() {
        let set: TreapSet<u32> = vec![3, 1, 2].into_iter().collect();
        assert_tokens(
            &set,
            &[
                Token::Seq { len: Some(3) },
                Token::U32(1),
                Token::U32(2),
                Token::U32(3),
                Token::SeqEnd,
            ],
        );
    }

    #[test]
    fn test_bincode_round_trip() {
        let set: TreapSet<u32> = (0..50).collect();
        let bytes = bincode::serialize(&set).expect("serialization failed");
        let ret: TreapSet<u32> = bincode::deserialize(&bytes).expect("deserialization failed");
        assert_eq!(ret, set);
    }
}
