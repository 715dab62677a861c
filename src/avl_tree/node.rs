use crate::arena::Handle;

/// A struct representing an internal node of an avl tree.
///
/// `left` and `right` are the owning links of the tree; `parent` only points back up and is never
/// followed to free a node.
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub height: i32,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
    pub parent: Option<Handle>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, parent: Option<Handle>) -> Self {
        Node {
            key,
            value,
            height: 0,
            left: None,
            right: None,
            parent,
        }
    }
}
