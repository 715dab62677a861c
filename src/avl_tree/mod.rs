//! Self-balancing binary search tree where the heights of the two child subtrees of any node
//! differ by at most one.

mod map;
mod node;
mod set;
mod tree;

pub use self::map::AvlMap;
pub use self::set::{AvlSet, AvlSetIntoIter, AvlSetIter, AvlSetPreorder};
pub use self::tree::{IntoIter as AvlMapIntoIter, Iter as AvlMapIter, Preorder as AvlMapPreorder};

/// Number of nodes allocated per arena chunk by `AvlMap::new` and `AvlSet::new`.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
