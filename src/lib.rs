//! A persistent treap and the ordered collections built on top of it.
//!
//! Every version of a [`Treap`](treap/struct.Treap.html) is immutable. Insertions, deletions,
//! unions, intersections, and differences return new versions that share all untouched subtrees
//! with their inputs, so old versions stay valid and can be read from any number of threads
//! without locking.
//!
//! The engine takes the ordering as an explicit comparator and the balance as explicit
//! priorities. [`TreapSet`](treap/struct.TreapSet.html) and
//! [`TreapMap`](treap/struct.TreapMap.html) supply both: they order by `Ord` and draw priorities
//! from a seeded random number generator.
//!
//! The set operations follow "Fast Set Operations Using Treaps" by Guy E. Blelloch and Margaret
//! Reid-Miller.

extern crate log;
extern crate rand;
extern crate serde;

mod entry;
pub mod treap;

pub use crate::entry::Entry;
