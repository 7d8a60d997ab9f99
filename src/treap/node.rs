use crate::treap::tree::{self, Tree};
use std::sync::Arc;

/// A struct representing an internal node of a persistent treap.
///
/// Nodes are never mutated once they are reachable from a root. Every operation that needs a
/// different node allocates a new one and shares the untouched children.
#[derive(Debug)]
pub struct Node<T> {
    pub value: T,
    pub priority: u32,
    pub len: usize,
    pub left: Tree<T>,
    pub right: Tree<T>,
}

impl<T> Node<T> {
    pub fn new(value: T, priority: u32, left: Tree<T>, right: Tree<T>) -> Arc<Self> {
        let len = 1 + tree::len(&left) + tree::len(&right);
        Arc::new(Node {
            value,
            priority,
            len,
            left,
            right,
        })
    }

    pub fn leaf(value: T, priority: u32) -> Arc<Self> {
        Node::new(value, priority, None, None)
    }
}

impl<T: Clone> Node<T> {
    /// Copies this node's value and priority onto a fresh node with new children.
    pub fn with_children(&self, left: Tree<T>, right: Tree<T>) -> Arc<Self> {
        Node::new(self.value.clone(), self.priority, left, right)
    }

    pub fn with_value(&self, value: T, left: Tree<T>, right: Tree<T>) -> Arc<Self> {
        Node::new(value, self.priority, left, right)
    }
}

// Unlinks uniquely owned descendants onto a work stack so that dropping a deep tree does not
// recurse once per level.
impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        let mut stack: Vec<Arc<Node<T>>> = Vec::new();
        stack.extend(self.left.take());
        stack.extend(self.right.take());
        while let Some(node) = stack.pop() {
            if let Ok(mut node) = Arc::try_unwrap(node) {
                stack.extend(node.left.take());
                stack.extend(node.right.take());
            }
        }
    }
}
