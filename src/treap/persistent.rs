use crate::treap::node::Node;
use crate::treap::tree::{self, Tree};
use crate::treap::Result;
use std::cmp::Ordering;
use std::fmt;

/// A persistent treap ordered by a caller-supplied comparator.
///
/// A treap is a tree that satisfies both the binary search tree property and a heap property. Each
/// node has a value and a priority. The value of any node is greater than all values in its left
/// subtree and less than all values occuring in its right subtree. The priority of a node is
/// greater than or equal to the priority of all nodes in its subtrees. When priorities are drawn
/// independently and uniformly at random, the expected height of the tree is proportional to the
/// logarithm of the number of values.
///
/// A `Treap<T>` is a handle to one immutable version of the tree. No operation ever modifies a
/// node that is reachable from an existing version: every operation returns a new version which
/// shares all untouched subtrees with its inputs. Cloning a `Treap<T>` is `O(1)`.
///
/// The treap neither generates nor checks priorities, and every operation that needs an ordering
/// takes the comparator explicitly. All treaps combined in one operation must be ordered by the
/// same comparator.
///
/// # Examples
///
/// ```
/// use persistent_treap::treap::Treap;
///
/// let t = Treap::new()
///     .insert(3, 7, u32::cmp)
///     .insert(1, 12, u32::cmp)
///     .insert(2, 5, u32::cmp);
///
/// assert_eq!(t.len(), 3);
/// assert_eq!(t.find(&1, u32::cmp), Some(&1));
///
/// let u = t.delete(&1, u32::cmp);
/// assert_eq!(u.iter().collect::<Vec<&u32>>(), vec![&2, &3]);
/// assert_eq!(t.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3]);
/// ```
pub struct Treap<T> {
    root: Tree<T>,
}

impl<T> Treap<T> {
    fn from_tree(root: Tree<T>) -> Self {
        Treap { root }
    }

    /// Constructs a new, empty `Treap<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::Treap;
    ///
    /// let t: Treap<u32> = Treap::new();
    /// assert!(t.is_empty());
    /// ```
    pub fn new() -> Self {
        Treap { root: None }
    }

    /// Constructs a treap containing a single value with a particular priority.
    pub fn singleton(value: T, priority: u32) -> Self {
        Treap {
            root: Some(Node::leaf(value, priority)),
        }
    }

    /// Returns the number of values in the treap. The length of every subtree is cached, so this
    /// is `O(1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::Treap;
    ///
    /// let t = Treap::singleton(1, 0);
    /// assert_eq!(t.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        tree::len(&self.root)
    }

    /// Returns `true` if the treap contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the value stored at the root of the treap.
    pub fn root(&self) -> Option<&T> {
        self.root.as_ref().map(|node| &node.value)
    }

    /// Returns the priority of the root of the treap, which is the maximum priority in the treap.
    pub fn priority(&self) -> Option<u32> {
        self.root.as_ref().map(|node| node.priority)
    }

    /// Returns `true` if both handles refer to the same version of the same tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::Treap;
    ///
    /// let t = Treap::singleton(1, 0);
    /// let u = t.clone();
    /// assert!(t.ptr_eq(&u));
    /// assert!(!t.ptr_eq(&Treap::singleton(1, 0)));
    /// ```
    pub fn ptr_eq(&self, other: &Self) -> bool {
        tree::is_same(&self.root, &other.root)
    }

    /// Calls `f` on every value of the treap in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let t = treap_union(u32::cmp, 1, vec![5, 3, 8, 1]);
    /// let mut values = Vec::new();
    /// t.for_each(|value| values.push(*value));
    /// assert_eq!(values, vec![1, 3, 5, 8]);
    /// ```
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        tree::for_each(&self.root, &mut f);
    }

    /// Returns an iterator over the treap. The iterator will yield values using in-order
    /// traversal.
    pub fn iter(&self) -> TreapIter<'_, T> {
        TreapIter {
            current: &self.root,
            stack: Vec::new(),
            remaining: self.len(),
        }
    }

    /// Returns the value in the treap that compares equal to `value`, or `None` if no such value
    /// exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let t = treap_union(u32::cmp, 1, vec![1, 2]);
    /// assert_eq!(t.find(&2, u32::cmp), Some(&2));
    /// assert_eq!(t.find(&3, u32::cmp), None);
    /// ```
    pub fn find<F>(&self, value: &T, cmp: F) -> Option<&T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        tree::find_by(&self.root, &|node_value: &T| cmp(node_value, value))
    }

    /// Returns the value for which `probe` returns `Ordering::Equal`. `probe` compares a value of
    /// the treap against the target, so it must be consistent with the treap's ordering.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let t = treap_union(|a: &(u32, char), b| a.0.cmp(&b.0), 1, vec![(1, 'a'), (2, 'b')]);
    /// assert_eq!(t.find_by(|entry| entry.0.cmp(&2)), Some(&(2, 'b')));
    /// ```
    pub fn find_by<F>(&self, probe: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        tree::find_by(&self.root, &probe)
    }

    /// Checks if a value exists in the treap.
    pub fn contains<F>(&self, value: &T, cmp: F) -> bool
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.find(value, cmp).is_some()
    }

    /// Returns the minimum value of the treap. Returns `None` if the treap is empty.
    pub fn min(&self) -> Option<&T> {
        tree::min(&self.root)
    }

    /// Returns the maximum value of the treap. Returns `None` if the treap is empty.
    pub fn max(&self) -> Option<&T> {
        tree::max(&self.root)
    }

    /// Returns the greatest value in the treap that is less than or equal to `value`.
    pub fn floor<F>(&self, value: &T, cmp: F) -> Option<&T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        tree::floor_by(&self.root, &|node_value: &T| cmp(node_value, value))
    }

    /// Returns the least value in the treap that is greater than or equal to `value`.
    pub fn ceil<F>(&self, value: &T, cmp: F) -> Option<&T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        tree::ceil_by(&self.root, &|node_value: &T| cmp(node_value, value))
    }

    pub(crate) fn floor_by<F>(&self, probe: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        tree::floor_by(&self.root, &probe)
    }

    pub(crate) fn ceil_by<F>(&self, probe: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        tree::ceil_by(&self.root, &probe)
    }

    /// Verifies the ordering, heap, and length invariants of every node.
    ///
    /// No other operation calls this. A comparator that is not a strict total order, or treaps
    /// ordered by different comparators being combined, is how a treap ends up invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::{Error, Treap};
    ///
    /// let l = Treap::singleton(5, 1);
    /// let r = Treap::singleton(3, 0);
    /// assert_eq!(l.validate(u32::cmp), Ok(()));
    ///
    /// // `join` expects every value on the left to be smaller.
    /// assert_eq!(l.join(&r).validate(u32::cmp), Err(Error::OrderViolation));
    /// ```
    pub fn validate<F>(&self, cmp: F) -> Result<()>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        tree::validate(&self.root, &cmp)
    }
}

impl<T: Clone> Treap<T> {
    /// Partitions the treap into the values less than `pivot`, the value equal to `pivot`, and
    /// the values greater than `pivot`. The middle treap is empty if `pivot` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let t = treap_union(u32::cmp, 1, vec![1, 2, 3, 4]);
    /// let (less, equal, greater) = t.split(&3, u32::cmp);
    /// assert_eq!(less.iter().collect::<Vec<&u32>>(), vec![&1, &2]);
    /// assert_eq!(equal.root(), Some(&3));
    /// assert_eq!(greater.iter().collect::<Vec<&u32>>(), vec![&4]);
    /// ```
    pub fn split<F>(&self, pivot: &T, cmp: F) -> (Self, Self, Self)
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.split_by(|value| cmp(value, pivot))
    }

    /// Partitions the treap around the pivot described by `probe`.
    pub fn split_by<F>(&self, probe: F) -> (Self, Self, Self)
    where
        F: Fn(&T) -> Ordering,
    {
        let (less, equal, greater) = tree::split_by(&self.root, &probe);
        (
            Treap::from_tree(less),
            Treap::from_tree(equal),
            Treap::from_tree(greater),
        )
    }

    /// Concatenates two treaps. Every value in `self` must be less than every value in `other`;
    /// this is not checked.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let l = treap_union(u32::cmp, 4, vec![1, 2]);
    /// let r = treap_union(u32::cmp, 9, vec![7, 8]);
    /// assert_eq!(l.join(&r).iter().collect::<Vec<&u32>>(), vec![&1, &2, &7, &8]);
    /// ```
    pub fn join(&self, other: &Self) -> Self {
        Treap::from_tree(tree::join(&self.root, &other.root))
    }

    /// Returns the union of two treaps. If both treaps contain a value that compares equal, the
    /// value from `other` is kept when `overwrite` is `true`, and the value from `self` otherwise.
    ///
    /// The root of the result is the root with the higher priority. On equal priorities the root
    /// of `self` wins, so the shape of the result may depend on the argument order even though
    /// its contents do not.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let cmp = |a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0);
    /// let n = treap_union(cmp, 1, vec![(1, 'a'), (2, 'a')]);
    /// let m = treap_union(cmp, 2, vec![(2, 'b'), (3, 'b')]);
    ///
    /// let kept = n.union(&m, cmp, false);
    /// assert_eq!(kept.find(&(2, ' '), cmp), Some(&(2, 'a')));
    ///
    /// let overwritten = n.union(&m, cmp, true);
    /// assert_eq!(overwritten.find(&(2, ' '), cmp), Some(&(2, 'b')));
    /// assert_eq!(overwritten.len(), 3);
    /// ```
    pub fn union<F>(&self, other: &Self, cmp: F, overwrite: bool) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        Treap::from_tree(tree::union(&self.root, &other.root, &cmp, overwrite))
    }

    /// Returns the values present in both treaps. Matching values are taken from `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let n = treap_union(u32::cmp, 1, vec![1, 2, 3]);
    /// let m = treap_union(u32::cmp, 1, vec![2, 3, 4]);
    /// assert_eq!(n.intersection(&m, u32::cmp).iter().collect::<Vec<&u32>>(), vec![&2, &3]);
    /// ```
    pub fn intersection<F>(&self, other: &Self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        Treap::from_tree(tree::intersection(&self.root, &other.root, &cmp))
    }

    /// Returns the values of `self` that are not present in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persistent_treap::treap::treap_union;
    ///
    /// let n = treap_union(u32::cmp, 1, vec![1, 2, 3]);
    /// let m = treap_union(u32::cmp, 1, vec![2, 3, 4]);
    /// assert_eq!(n.diff(&m, u32::cmp).iter().collect::<Vec<&u32>>(), vec![&1]);
    /// ```
    pub fn diff<F>(&self, other: &Self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        Treap::from_tree(tree::difference(&self.root, &other.root, &cmp))
    }

    /// Returns a treap without the value that compares equal to `value`.
    pub fn delete<F>(&self, value: &T, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.delete_by(|node_value| cmp(node_value, value))
    }

    /// Returns a treap without the value for which `probe` returns `Ordering::Equal`.
    pub fn delete_by<F>(&self, probe: F) -> Self
    where
        F: Fn(&T) -> Ordering,
    {
        Treap::from_tree(tree::delete_by(&self.root, &probe))
    }

    /// Returns a treap that contains `value` with a particular priority, replacing any value that
    /// compares equal.
    pub fn insert<F>(&self, value: T, priority: u32, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering,
    {
        self.union(&Treap::singleton(value, priority), cmp, true)
    }
}

/// Builds a treap by folding a non-overwriting union over `items`, giving every value the same
/// `priority`. Because the priorities are not random the result is not balanced; this is meant
/// for small, hand-written treaps.
///
/// # Examples
///
/// ```
/// use persistent_treap::treap::treap_union;
///
/// let t = treap_union(u32::cmp, 1, vec![5, 3, 8, 1]);
/// assert_eq!(t.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5, &8]);
/// ```
pub fn treap_union<T, F, I>(cmp: F, priority: u32, items: I) -> Treap<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
    I: IntoIterator<Item = T>,
{
    items.into_iter().fold(Treap::new(), |treap, item| {
        Treap::from_tree(tree::union(
            &treap.root,
            &Some(Node::leaf(item, priority)),
            &cmp,
            false,
        ))
    })
}

impl<T> Clone for Treap<T> {
    fn clone(&self) -> Self {
        Treap {
            root: self.root.clone(),
        }
    }
}

impl<T> Default for Treap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Treap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Two treaps are equal if their in-order traversals are equal, regardless of shape.
impl<T: PartialEq> PartialEq for Treap<T> {
    fn eq(&self, other: &Treap<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Treap<T> {}

impl<'a, T: 'a> IntoIterator for &'a Treap<T> {
    type Item = &'a T;
    type IntoIter = TreapIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `Treap<T>`
///
/// This iterator traverses the values of a treap in-order and yields immutable references.
pub struct TreapIter<'a, T: 'a> {
    current: &'a Tree<T>,
    stack: Vec<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T: 'a> Iterator for TreapIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ref node) = *self.current {
            self.current = &node.left;
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            self.current = &node.right;
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: 'a> ExactSizeIterator for TreapIter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::{treap_union, Treap};
    use std::sync::Arc;
    use std::thread;

    fn collect(treap: &Treap<u32>) -> Vec<u32> {
        treap.iter().cloned().collect()
    }

    #[test]
    fn test_len_empty() {
        let treap: Treap<u32> = Treap::new();
        assert_eq!(treap.len(), 0);
        assert!(treap.is_empty());
        assert_eq!(treap.root(), None);
        assert_eq!(treap.priority(), None);
    }

    #[test]
    fn test_min_max_empty() {
        let treap: Treap<u32> = Treap::new();
        assert_eq!(treap.min(), None);
        assert_eq!(treap.max(), None);
    }

    #[test]
    fn test_build_equal_priorities() {
        let treap = treap_union(u32::cmp, 1, vec![5, 3, 8, 1]);
        assert_eq!(collect(&treap), vec![1, 3, 5, 8]);
        assert_eq!(treap.root(), Some(&5));
        assert_eq!(treap.validate(u32::cmp), Ok(()));
    }

    #[test]
    fn test_build_ignores_duplicates() {
        let treap = treap_union(u32::cmp, 1, vec![2, 1, 2, 1]);
        assert_eq!(collect(&treap), vec![1, 2]);
        assert_eq!(treap.len(), 2);
    }

    #[test]
    fn test_delete() {
        let treap = treap_union(u32::cmp, 1, vec![5, 3, 8, 1]);
        let deleted = treap.delete(&3, u32::cmp);
        assert_eq!(collect(&deleted), vec![1, 5, 8]);
        assert_eq!(deleted.find(&3, u32::cmp), None);
        assert_eq!(deleted.len(), 3);
        assert_eq!(treap.find(&3, u32::cmp), Some(&3));
    }

    #[test]
    fn test_delete_absent() {
        let treap = treap_union(u32::cmp, 1, vec![5, 3, 8, 1]);
        let deleted = treap.delete(&4, u32::cmp);
        assert_eq!(collect(&deleted), vec![1, 3, 5, 8]);
        assert_eq!(deleted.len(), 4);
    }

    #[test]
    fn test_set_operations() {
        let n = treap_union(u32::cmp, 1, vec![1, 2, 3]);
        let m = treap_union(u32::cmp, 1, vec![2, 3, 4]);

        assert_eq!(collect(&n.intersection(&m, u32::cmp)), vec![2, 3]);
        assert_eq!(collect(&n.diff(&m, u32::cmp)), vec![1]);
        assert_eq!(collect(&n.union(&m, u32::cmp, false)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_set_operations_with_empty() {
        let n = treap_union(u32::cmp, 1, vec![1, 2, 3]);
        let empty = Treap::new();

        assert!(n.intersection(&empty, u32::cmp).is_empty());
        assert!(empty.intersection(&n, u32::cmp).is_empty());
        assert!(n.diff(&empty, u32::cmp).ptr_eq(&n));
        assert!(empty.diff(&n, u32::cmp).is_empty());
        assert!(n.union(&empty, u32::cmp, true).ptr_eq(&n));
        assert!(empty.union(&n, u32::cmp, false).ptr_eq(&n));
    }

    #[test]
    fn test_union_self() {
        let treap = treap_union(u32::cmp, 3, vec![4, 2, 6, 1, 3]);
        assert_eq!(treap.union(&treap, u32::cmp, false), treap);
        assert_eq!(treap.intersection(&treap, u32::cmp), treap);
        assert!(treap.diff(&treap, u32::cmp).is_empty());
    }

    // With equal priorities the receiver's root wins, so the shape depends on argument order.
    #[test]
    fn test_union_priority_tie() {
        let n = Treap::singleton(1, 7);
        let m = Treap::singleton(2, 7);

        let nm = n.union(&m, u32::cmp, false);
        let mn = m.union(&n, u32::cmp, false);
        assert_eq!(nm.root(), Some(&1));
        assert_eq!(mn.root(), Some(&2));
        assert_eq!(nm, mn);
    }

    #[test]
    fn test_union_overwrite_follows_other() {
        let cmp = |a: &(u32, u32), b: &(u32, u32)| a.0.cmp(&b.0);
        let high = Treap::singleton((1, 100), 9);
        let low = Treap::singleton((1, 200), 1);

        // `other` has the lower priority.
        assert_eq!(high.union(&low, cmp, true).root(), Some(&(1, 200)));
        assert_eq!(high.union(&low, cmp, false).root(), Some(&(1, 100)));
        // `other` has the higher priority, so the roles swap internally.
        assert_eq!(low.union(&high, cmp, true).root(), Some(&(1, 100)));
        assert_eq!(low.union(&high, cmp, false).root(), Some(&(1, 200)));
    }

    #[test]
    fn test_intersection_keeps_receiver_values() {
        let cmp = |a: &(u32, u32), b: &(u32, u32)| a.0.cmp(&b.0);
        let low = treap_union(cmp, 1, vec![(1, 10), (2, 10)]);
        let high = treap_union(cmp, 9, vec![(2, 20), (3, 20)]);

        let ret = low.intersection(&high, cmp);
        assert_eq!(ret.iter().collect::<Vec<_>>(), vec![&(2, 10)]);
        let ret = high.intersection(&low, cmp);
        assert_eq!(ret.iter().collect::<Vec<_>>(), vec![&(2, 20)]);
    }

    #[test]
    fn test_diff_lower_priority_receiver() {
        let n = treap_union(u32::cmp, 1, vec![1, 2, 3, 4, 5]);
        let m = treap_union(u32::cmp, 9, vec![2, 4, 6]);
        let ret = n.diff(&m, u32::cmp);
        assert_eq!(collect(&ret), vec![1, 3, 5]);
        assert_eq!(ret.validate(u32::cmp), Ok(()));
        assert!(ret.priority().map_or(false, |priority| priority <= 1));
    }

    #[test]
    fn test_insert_replaces() {
        let cmp = |a: &(u32, u32), b: &(u32, u32)| a.0.cmp(&b.0);
        let treap = Treap::new().insert((1, 1), 5, cmp).insert((2, 1), 3, cmp);
        let replaced_low = treap.insert((1, 2), 1, cmp);
        let replaced_high = treap.insert((1, 3), 9, cmp);
        assert_eq!(replaced_low.find(&(1, 0), cmp), Some(&(1, 2)));
        assert_eq!(replaced_high.find(&(1, 0), cmp), Some(&(1, 3)));
        assert_eq!(replaced_high.priority(), Some(9));
        assert_eq!(replaced_low.len(), 2);
        assert_eq!(treap.find(&(1, 0), cmp), Some(&(1, 1)));
    }

    #[test]
    fn test_floor_ceil() {
        let treap = treap_union(u32::cmp, 1, vec![1, 3, 5]);
        assert_eq!(treap.floor(&0, u32::cmp), None);
        assert_eq!(treap.floor(&2, u32::cmp), Some(&1));
        assert_eq!(treap.ceil(&4, u32::cmp), Some(&5));
        assert_eq!(treap.ceil(&6, u32::cmp), None);
    }

    #[test]
    fn test_iter_exact_size() {
        let treap = treap_union(u32::cmp, 1, vec![1, 3, 5]);
        let mut iter = treap.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn test_debug() {
        let treap = treap_union(u32::cmp, 1, vec![2, 1]);
        assert_eq!(format!("{:?}", treap), "{1, 2}");
    }

    #[test]
    fn test_concurrent_readers() {
        let treap = Arc::new(treap_union(u32::cmp, 1, 0..64));
        let handles: Vec<_> = (0..4)
            .map(|offset| {
                let treap = Arc::clone(&treap);
                thread::spawn(move || {
                    let removed = treap.delete(&offset, u32::cmp);
                    assert_eq!(removed.len(), 63);
                    treap.iter().cloned().sum::<u32>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().ok(), Some((0..64).sum::<u32>()));
        }
        assert_eq!(treap.len(), 64);
    }
}
