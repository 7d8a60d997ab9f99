//! Persistent binary search tree where each node also maintains the heap invariant.

mod map;
mod node;
mod persistent;
mod set;
mod tree;

pub use self::map::{TreapMap, TreapMapIter};
pub use self::persistent::{treap_union, Treap, TreapIter};
pub use self::set::{TreapSet, TreapSetIter};
use std::error;
use std::fmt;
use std::result;

/// The invariant a treap failed to uphold, as reported by `Treap::validate`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A value is out of order relative to an ancestor, or appears twice.
    OrderViolation,
    /// A child has a strictly greater priority than its parent.
    HeapViolation { parent: u32, child: u32 },
    /// A node's cached length disagrees with the sizes of its subtrees.
    LengthMismatch { expected: usize, actual: usize },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OrderViolation => write!(f, "values are not in strictly increasing order"),
            Error::HeapViolation { parent, child } => write!(
                f,
                "child priority {} exceeds parent priority {}",
                child, parent,
            ),
            Error::LengthMismatch { expected, actual } => write!(
                f,
                "cached length {} does not match subtree length {}",
                actual, expected,
            ),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
