//! Ordered collections backed by an avl tree whose nodes keep a link to their parent.
//!
//! Nodes are stored in a chunked arena and refer to each other by handle, so the parent link is a
//! plain back-reference that never owns anything. After every insertion or removal the tree walks
//! up from the changed node, refreshing cached heights and restructuring the first unbalanced
//! ancestor it meets.
//!
//! # Examples
//! ```
//! use avl_collections::avl_tree::AvlMap;
//!
//! let mut map = AvlMap::new();
//! for key in &[10, 20, 30] {
//!     map.insert(*key, key * 2);
//! }
//!
//! assert_eq!(map.height(), 1);
//! assert_eq!(map.find(&20), Some(&40));
//! assert_eq!(
//!     map.preorder().map(|(key, _)| *key).collect::<Vec<u32>>(),
//!     vec![20, 10, 30],
//! );
//! ```

mod arena;
mod error;
pub mod avl_tree;

pub use crate::error::{Error, Result};
