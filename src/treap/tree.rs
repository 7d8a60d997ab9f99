use crate::treap::node::Node;
use crate::treap::{Error, Result};
use std::cmp::Ordering;
use std::sync::Arc;

pub type Tree<T> = Option<Arc<Node<T>>>;

pub fn len<T>(tree: &Tree<T>) -> usize {
    match tree {
        Some(node) => node.len,
        None => 0,
    }
}

pub fn is_same<T>(a: &Tree<T>, b: &Tree<T>) -> bool {
    match (a, b) {
        (Some(a_node), Some(b_node)) => Arc::ptr_eq(a_node, b_node),
        (None, None) => true,
        _ => false,
    }
}

// Reuses `tree` itself when both children came back untouched.
fn rebuild<T: Clone>(tree: &Tree<T>, node: &Arc<Node<T>>, left: Tree<T>, right: Tree<T>) -> Tree<T> {
    if is_same(&node.left, &left) && is_same(&node.right, &right) {
        tree.clone()
    } else {
        Some(node.with_children(left, right))
    }
}

pub fn for_each<T, F>(tree: &Tree<T>, f: &mut F)
where
    F: FnMut(&T),
{
    let mut stack = Vec::new();
    let mut curr = tree;
    loop {
        while let Some(node) = curr {
            stack.push(node);
            curr = &node.left;
        }
        match stack.pop() {
            Some(node) => {
                f(&node.value);
                curr = &node.right;
            },
            None => return,
        }
    }
}

/// Descends the tree using `probe`, which compares a node's value against the target.
pub fn find_by<'a, T, F>(tree: &'a Tree<T>, probe: &F) -> Option<&'a T>
where
    F: Fn(&T) -> Ordering,
{
    let mut curr = tree;
    while let Some(ref node) = *curr {
        match probe(&node.value) {
            Ordering::Less => curr = &node.right,
            Ordering::Greater => curr = &node.left,
            Ordering::Equal => return Some(&node.value),
        }
    }
    None
}

pub fn floor_by<'a, T, F>(tree: &'a Tree<T>, probe: &F) -> Option<&'a T>
where
    F: Fn(&T) -> Ordering,
{
    let mut curr = tree;
    let mut floor = None;
    while let Some(node) = curr {
        match probe(&node.value) {
            Ordering::Greater => curr = &node.left,
            Ordering::Less => {
                floor = Some(&node.value);
                curr = &node.right;
            },
            Ordering::Equal => return Some(&node.value),
        }
    }
    floor
}

pub fn ceil_by<'a, T, F>(tree: &'a Tree<T>, probe: &F) -> Option<&'a T>
where
    F: Fn(&T) -> Ordering,
{
    let mut curr = tree;
    let mut ceil = None;
    while let Some(node) = curr {
        match probe(&node.value) {
            Ordering::Less => curr = &node.right,
            Ordering::Greater => {
                ceil = Some(&node.value);
                curr = &node.left;
            },
            Ordering::Equal => return Some(&node.value),
        }
    }
    ceil
}

pub fn min<T>(tree: &Tree<T>) -> Option<&T> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref left_node) = curr.left {
            curr = left_node;
        }
        &curr.value
    })
}

pub fn max<T>(tree: &Tree<T>) -> Option<&T> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref right_node) = curr.right {
            curr = right_node;
        }
        &curr.value
    })
}

/// Partitions `tree` into the values less than, equal to, and greater than the pivot described
/// by `probe`. Every node on the search path is copied; everything off the path is shared.
pub fn split_by<T, F>(tree: &Tree<T>, probe: &F) -> (Tree<T>, Tree<T>, Tree<T>)
where
    T: Clone,
    F: Fn(&T) -> Ordering,
{
    // Each entry records a node on the search path and whether it sorts below the pivot.
    let mut path = Vec::new();
    let mut curr = tree;
    let (mut less, equal, mut greater) = loop {
        match curr {
            Some(node) => match probe(&node.value) {
                Ordering::Less => {
                    path.push((node, true));
                    curr = &node.right;
                },
                Ordering::Greater => {
                    path.push((node, false));
                    curr = &node.left;
                },
                Ordering::Equal => {
                    let equal = node.with_children(None, None);
                    break (node.left.clone(), Some(equal), node.right.clone());
                },
            },
            None => break (None, None, None),
        }
    };

    while let Some((node, is_less)) = path.pop() {
        if is_less {
            less = Some(node.with_children(node.left.clone(), less));
        } else {
            greater = Some(node.with_children(greater, node.right.clone()));
        }
    }
    (less, equal, greater)
}

pub fn split<T, F>(tree: &Tree<T>, pivot: &T, cmp: &F) -> (Tree<T>, Tree<T>, Tree<T>)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    split_by(tree, &|value: &T| cmp(value, pivot))
}

/// Zips the right spine of `l_tree` with the left spine of `r_tree`. Every value in `l_tree` must
/// be less than every value in `r_tree`.
pub fn join<T: Clone>(l_tree: &Tree<T>, r_tree: &Tree<T>) -> Tree<T> {
    // Each entry records a spine node and whether it came from `l_tree`.
    let mut spine = Vec::new();
    let (mut l_curr, mut r_curr) = (l_tree, r_tree);
    let mut joined = loop {
        match (l_curr, r_curr) {
            (Some(l_node), Some(r_node)) => {
                if l_node.priority >= r_node.priority {
                    spine.push((l_node, true));
                    l_curr = &l_node.right;
                } else {
                    spine.push((r_node, false));
                    r_curr = &r_node.left;
                }
            },
            (tree, None) | (None, tree) => break tree.clone(),
        }
    };

    while let Some((node, from_left)) = spine.pop() {
        joined = if from_left {
            Some(node.with_children(node.left.clone(), joined))
        } else {
            Some(node.with_children(joined, node.right.clone()))
        };
    }
    joined
}

pub fn delete_by<T, F>(tree: &Tree<T>, probe: &F) -> Tree<T>
where
    T: Clone,
    F: Fn(&T) -> Ordering,
{
    let (less, _, greater) = split_by(tree, probe);
    join(&less, &greater)
}

/// Merges two trees. On a duplicate, the value from `other` is kept when `overwrite` is set.
pub fn union<T, F>(tree: &Tree<T>, other: &Tree<T>, cmp: &F, overwrite: bool) -> Tree<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    match (tree, other) {
        (Some(node), Some(other_node)) => {
            if node.priority < other_node.priority {
                return union(other, tree, cmp, !overwrite);
            }
            let (less, dupe, greater) = split(other, &node.value, cmp);
            let left = union(&node.left, &less, cmp, overwrite);
            let right = union(&node.right, &greater, cmp, overwrite);
            match dupe {
                Some(ref dupe_node) if overwrite => {
                    Some(node.with_value(dupe_node.value.clone(), left, right))
                },
                _ => rebuild(tree, node, left, right),
            }
        },
        (tree, None) | (None, tree) => tree.clone(),
    }
}

/// Keeps the values present in both trees. Duplicates resolve to the value from `tree`.
pub fn intersection<T, F>(tree: &Tree<T>, other: &Tree<T>, cmp: &F) -> Tree<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    intersect(tree, other, cmp, false)
}

fn intersect<T, F>(tree: &Tree<T>, other: &Tree<T>, cmp: &F, swapped: bool) -> Tree<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    match (tree, other) {
        (Some(node), Some(other_node)) => {
            if node.priority < other_node.priority {
                return intersect(other, tree, cmp, !swapped);
            }
            let (less, dupe, greater) = split(other, &node.value, cmp);
            let left = intersect(&node.left, &less, cmp, swapped);
            let right = intersect(&node.right, &greater, cmp, swapped);
            match dupe {
                Some(ref dupe_node) if swapped => {
                    Some(node.with_value(dupe_node.value.clone(), left, right))
                },
                Some(_) => rebuild(tree, node, left, right),
                None => join(&left, &right),
            }
        },
        _ => None,
    }
}

/// Keeps the values of `tree` that are absent from `other`. No node of `other` is retained.
pub fn difference<T, F>(tree: &Tree<T>, other: &Tree<T>, cmp: &F) -> Tree<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    match (tree, other) {
        (Some(node), Some(other_node)) => {
            if node.priority >= other_node.priority {
                let (less, dupe, greater) = split(other, &node.value, cmp);
                let left = difference(&node.left, &less, cmp);
                let right = difference(&node.right, &greater, cmp);
                if dupe.is_some() {
                    join(&left, &right)
                } else {
                    rebuild(tree, node, left, right)
                }
            } else {
                let (less, _, greater) = split(tree, &other_node.value, cmp);
                let left = difference(&less, &other_node.left, cmp);
                let right = difference(&greater, &other_node.right, cmp);
                join(&left, &right)
            }
        },
        _ => tree.clone(),
    }
}

pub fn validate<T, F>(tree: &Tree<T>, cmp: &F) -> Result<()>
where
    F: Fn(&T, &T) -> Ordering,
{
    // Each entry is a subtree with the exclusive bounds its values must fall between.
    let mut stack: Vec<(&Tree<T>, Option<&T>, Option<&T>)> = vec![(tree, None, None)];
    while let Some((tree, lower, upper)) = stack.pop() {
        if let Some(node) = tree {
            validate_node(node, lower, upper, cmp)?;
            stack.push((&node.right, Some(&node.value), upper));
            stack.push((&node.left, lower, Some(&node.value)));
        }
    }
    Ok(())
}

fn validate_node<T, F>(node: &Node<T>, lower: Option<&T>, upper: Option<&T>, cmp: &F) -> Result<()>
where
    F: Fn(&T, &T) -> Ordering,
{
    let above_lower = lower.map_or(true, |lower| cmp(lower, &node.value) == Ordering::Less);
    let below_upper = upper.map_or(true, |upper| cmp(&node.value, upper) == Ordering::Less);
    if !above_lower || !below_upper {
        return Err(Error::OrderViolation);
    }

    for child in &[&node.left, &node.right] {
        if let Some(child_node) = child {
            if child_node.priority > node.priority {
                return Err(Error::HeapViolation {
                    parent: node.priority,
                    child: child_node.priority,
                });
            }
        }
    }

    let expected = 1 + len(&node.left) + len(&node.right);
    if node.len != expected {
        return Err(Error::LengthMismatch {
            expected,
            actual: node.len,
        });
    }

    Ok(())
}
