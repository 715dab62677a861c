use crate::arena::{Arena, Handle};
use crate::avl_tree::node::Node;
use log::{debug, trace};
use std::borrow::Borrow;
use std::cmp::{self, Ordering};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

/// The parent-linked node graph of an avl tree together with the arena that owns its nodes.
///
/// Every node is reachable from `root` through `left`/`right` links. The number of live nodes is
/// the number of occupied arena slots.
pub struct Tree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Option<Handle>,
}

impl<K, V> Tree<K, V> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            nodes: Arena::new(chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree: -1 when empty, 0 for a single node.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    pub fn clear(&mut self) {
        debug!("tearing down avl tree with {} nodes", self.nodes.len());
        self.root = None;
        self.nodes.clear();
    }

    fn height_of(&self, link: Option<Handle>) -> i32 {
        match link {
            None => -1,
            Some(handle) => self.nodes[handle].height,
        }
    }

    fn update_height(&mut self, handle: Handle) {
        let (left, right) = {
            let node = &self.nodes[handle];
            (node.left, node.right)
        };
        let height = cmp::max(self.height_of(left), self.height_of(right)) + 1;
        self.nodes[handle].height = height;
    }

    fn balance_factor(&self, handle: Handle) -> i32 {
        let node = &self.nodes[handle];
        self.height_of(node.left) - self.height_of(node.right)
    }

    fn is_balanced(&self, handle: Handle) -> bool {
        self.balance_factor(handle).abs() <= 1
    }

    fn set_left(&mut self, parent: Handle, child: Option<Handle>) {
        self.nodes[parent].left = child;
        if let Some(child) = child {
            self.nodes[child].parent = Some(parent);
        }
    }

    fn set_right(&mut self, parent: Handle, child: Option<Handle>) {
        self.nodes[parent].right = child;
        if let Some(child) = child {
            self.nodes[child].parent = Some(parent);
        }
    }

    /// Puts `new` into the slot `old` occupies under `parent`, or makes it the root.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => {
                self.root = new;
                if let Some(new) = new {
                    self.nodes[new].parent = None;
                }
            },
            Some(parent) => {
                if self.nodes[parent].left == Some(old) {
                    self.set_left(parent, new);
                } else {
                    debug_assert_eq!(self.nodes[parent].right, Some(old));
                    self.set_right(parent, new);
                }
            },
        }
    }

    fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes[handle].left {
            handle = left;
        }
        handle
    }

    fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes[handle].right {
            handle = right;
        }
        handle
    }

    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.nodes[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    // ties go to `preferred`
    fn taller_child(&self, handle: Handle, preferred: Side) -> Handle {
        let node = &self.nodes[handle];
        let side = match self.balance_factor(handle) {
            b if b > 0 => Side::Left,
            b if b < 0 => Side::Right,
            _ => preferred,
        };
        let child = match side {
            Side::Left => node.left,
            Side::Right => node.right,
        };
        match child {
            Some(child) => child,
            None => unreachable!("taller child of a node without children"),
        }
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.nodes[self.leftmost(root)];
            (&node.key, &node.value)
        })
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.nodes[self.rightmost(root)];
            (&node.key, &node.value)
        })
    }

    pub fn preorder(&self) -> Preorder<'_, K, V> {
        Preorder {
            nodes: &self.nodes,
            stack: self.root.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            current: self.root,
            stack: Vec::new(),
        }
    }
}

impl<K, V> Tree<K, V>
where
    K: Ord,
{
    fn find_handle<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.nodes[handle];
            curr = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_handle(key).map(|handle| &self.nodes[handle].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find_handle(key) {
            Some(handle) => Some(&mut self.nodes[handle].value),
            None => None,
        }
    }

    /// Greatest key less than or equal to `key`.
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        let mut best = None;
        while let Some(handle) = curr {
            let node = &self.nodes[handle];
            curr = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    best = Some(&node.key);
                    node.right
                },
                Ordering::Equal => return Some(&node.key),
            };
        }
        best
    }

    /// Least key greater than or equal to `key`.
    pub fn ceil<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        let mut best = None;
        while let Some(handle) = curr {
            let node = &self.nodes[handle];
            curr = match key.cmp(node.key.borrow()) {
                Ordering::Greater => node.right,
                Ordering::Less => {
                    best = Some(&node.key);
                    node.left
                },
                Ordering::Equal => return Some(&node.key),
            };
        }
        best
    }

    /// Attaches a new leaf for `key` unless the key is already present. Returns whether a node
    /// was added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.nodes[handle];
            parent = Some(handle);
            curr = match key.cmp(&node.key) {
                Ordering::Less => {
                    side = Side::Left;
                    node.left
                },
                Ordering::Greater => {
                    side = Side::Right;
                    node.right
                },
                Ordering::Equal => return false,
            };
        }

        let leaf = self.nodes.allocate(Node::new(key, value, parent));
        match (parent, side) {
            (None, _) => self.root = Some(leaf),
            (Some(parent), Side::Left) => self.nodes[parent].left = Some(leaf),
            (Some(parent), Side::Right) => self.nodes[parent].right = Some(leaf),
        }

        self.rebalance_after_insert(parent);
        self.after_mutation();
        true
    }

    /// Unlinks the node holding `key` and hands back its pair.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find_handle(key)?;
        let (left, right, parent) = {
            let node = &self.nodes[target];
            (node.left, node.right, node.parent)
        };

        // lowest node whose subtree changed shape
        let changed = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.leftmost(right);
                let changed = if successor == right {
                    self.set_left(successor, Some(left));
                    successor
                } else {
                    let successor_parent = match self.nodes[successor].parent {
                        Some(successor_parent) => successor_parent,
                        None => unreachable!("successor below the target has no parent"),
                    };
                    let successor_right = self.nodes[successor].right;
                    self.set_left(successor_parent, successor_right);
                    self.set_left(successor, Some(left));
                    self.set_right(successor, Some(right));
                    successor_parent
                };
                self.replace_child(parent, target, Some(successor));
                Some(changed)
            },
            (child, None) | (None, child) => {
                self.replace_child(parent, target, child);
                parent
            },
        };

        let Node { key, value, .. } = self.nodes.free(target);
        self.rebalance_after_remove(changed);
        self.after_mutation();
        Some((key, value))
    }

    // A single restructuring restores the subtree to its height before the insertion, so nothing
    // above it changes.
    fn rebalance_after_insert(&mut self, start: Option<Handle>) {
        let mut curr = start;
        while let Some(handle) = curr {
            let old_height = self.nodes[handle].height;
            self.update_height(handle);
            if !self.is_balanced(handle) {
                self.restructure(handle);
                return;
            }
            if self.nodes[handle].height == old_height {
                return;
            }
            curr = self.nodes[handle].parent;
        }
    }

    fn rebalance_after_remove(&mut self, start: Option<Handle>) {
        let mut curr = start;
        while let Some(handle) = curr {
            self.update_height(handle);
            let top = if self.is_balanced(handle) {
                handle
            } else {
                self.restructure(handle)
            };
            curr = self.nodes[top].parent;
        }
    }

    /// Trinode restructuring around the unbalanced node `z`. Returns the new local root.
    fn restructure(&mut self, z: Handle) -> Handle {
        let y = self.taller_child(z, Side::Left);
        let x = self.taller_child(y, self.side_of(z, y));
        let parent = self.nodes[z].parent;

        let mut sorted = [x, y, z];
        {
            let nodes = &self.nodes;
            sorted.sort_by(|&p, &q| nodes[p].key.cmp(&nodes[q].key));
        }
        let [a, b, c] = sorted;

        // the six child links of a, b, c in key order, minus the links among x, y, z
        let mut subtrees = [None; 4];
        let mut count = 0;
        for &handle in &sorted {
            let node = &self.nodes[handle];
            for &link in &[node.left, node.right] {
                if link == Some(x) || link == Some(y) || link == Some(z) {
                    continue;
                }
                subtrees[count] = link;
                count += 1;
            }
        }
        debug_assert_eq!(count, 4);

        self.set_left(a, subtrees[0]);
        self.set_right(a, subtrees[1]);
        self.set_left(c, subtrees[2]);
        self.set_right(c, subtrees[3]);
        self.set_left(b, Some(a));
        self.set_right(b, Some(c));

        self.update_height(a);
        self.update_height(c);
        self.update_height(b);
        self.replace_child(parent, z, Some(b));

        debug_assert!(self.is_balanced(a) && self.is_balanced(b) && self.is_balanced(c));
        trace!(
            "{} rotation, subtree height now {}",
            if b == y { "single" } else { "double" },
            self.nodes[b].height,
        );
        b
    }

    fn after_mutation(&self) {
        if cfg!(any(test, feature = "check-invariants")) {
            self.check_invariants();
        }
    }

    /// Walks the whole tree and panics if any structural invariant is broken: key order, parent
    /// links, cached heights, balance, or the node count.
    pub fn check_invariants(&self) {
        let root = match self.root {
            None => {
                assert_eq!(self.nodes.len(), 0, "empty tree still owns nodes");
                return;
            },
            Some(root) => root,
        };
        assert_eq!(self.nodes[root].parent, None, "root has a parent");

        let mut visited = 0;
        let mut stack: Vec<(Handle, Option<&K>, Option<&K>)> = vec![(root, None, None)];
        while let Some((handle, lower, upper)) = stack.pop() {
            visited += 1;
            let node = &self.nodes[handle];
            if let Some(lower) = lower {
                assert!(*lower < node.key, "key order violated in a right subtree");
            }
            if let Some(upper) = upper {
                assert!(node.key < *upper, "key order violated in a left subtree");
            }

            let (left, right) = (self.height_of(node.left), self.height_of(node.right));
            assert_eq!(node.height, cmp::max(left, right) + 1, "stale cached height");
            assert!((left - right).abs() <= 1, "balance factor out of range");

            if let Some(child) = node.left {
                assert_eq!(self.nodes[child].parent, Some(handle), "left child parent link");
                stack.push((child, lower, Some(&node.key)));
            }
            if let Some(child) = node.right {
                assert_eq!(self.nodes[child].parent, Some(handle), "right child parent link");
                stack.push((child, Some(&node.key), upper));
            }
        }
        assert_eq!(visited, self.nodes.len(), "unreachable nodes in the arena");
    }
}

/// Preorder walk over a tree: node, left subtree, right subtree.
pub struct Preorder<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    stack: Vec<Handle>,
}

impl<'a, K, V> Iterator for Preorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let handle = self.stack.pop()?;
        let node = &nodes[handle];
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some((&node.key, &node.value))
    }
}

/// In-order walk over a tree.
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = nodes[handle].left;
        }
        let node = &nodes[self.stack.pop()?];
        self.current = node.right;
        Some((&node.key, &node.value))
    }
}

/// Consuming in-order walk. Nodes are released from the arena as they are yielded.
pub struct IntoIter<K, V> {
    nodes: Arena<Node<K, V>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<K, V> IntoIterator for Tree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            nodes: self.nodes,
            current: self.root,
            stack: Vec::new(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.nodes[handle].left;
        }
        self.stack.pop().map(|handle| {
            let Node { key, value, right, .. } = self.nodes.free(handle);
            self.current = right;
            (key, value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;

    fn tree_from(keys: &[u32]) -> Tree<u32, u32> {
        let mut tree = Tree::new(16);
        for &key in keys {
            assert!(tree.insert(key, key * 10));
        }
        tree
    }

    fn preorder_keys(tree: &Tree<u32, u32>) -> Vec<u32> {
        tree.preorder().map(|(key, _)| *key).collect()
    }

    #[test]
    fn test_empty() {
        let tree: Tree<u32, u32> = Tree::new(16);
        assert_eq!(tree.height(), -1);
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.get(&1), None);
        assert_eq!(tree.preorder().next(), None);
        tree.check_invariants();
    }

    #[test]
    fn test_single_node_height() {
        let tree = tree_from(&[7]);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_right_right_rotation() {
        let tree = tree_from(&[10, 20, 30]);
        assert_eq!(preorder_keys(&tree), vec![20, 10, 30]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_left_left_rotation() {
        let tree = tree_from(&[30, 20, 10]);
        assert_eq!(preorder_keys(&tree), vec![20, 10, 30]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_left_right_rotation() {
        let tree = tree_from(&[30, 10, 20]);
        assert_eq!(preorder_keys(&tree), vec![20, 10, 30]);
    }

    #[test]
    fn test_right_left_rotation() {
        let tree = tree_from(&[10, 30, 20]);
        assert_eq!(preorder_keys(&tree), vec![20, 10, 30]);
    }

    #[test]
    fn test_insert_below_rotated_subtree() {
        let tree = tree_from(&[30, 20, 10, 25]);
        assert_eq!(preorder_keys(&tree), vec![20, 10, 30, 25]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut tree = tree_from(&[1, 2, 3]);
        assert!(!tree.insert(2, 0));
        assert_eq!(tree.get(&2), Some(&20));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_remove_leaf() {
        let mut tree = tree_from(&[2, 1, 3]);
        assert_eq!(tree.remove(&3), Some((3, 30)));
        assert_eq!(preorder_keys(&tree), vec![2, 1]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_remove_one_child() {
        let mut tree = tree_from(&[2, 1, 3, 4]);
        assert_eq!(tree.remove(&3), Some((3, 30)));
        assert_eq!(preorder_keys(&tree), vec![2, 1, 4]);
    }

    #[test]
    fn test_remove_root_with_one_child() {
        let mut tree = tree_from(&[1, 2]);
        assert_eq!(tree.remove(&1), Some((1, 10)));
        assert_eq!(preorder_keys(&tree), vec![2]);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_remove_successor_is_right_child() {
        let mut tree = tree_from(&[2, 1, 3]);
        assert_eq!(tree.remove(&2), Some((2, 20)));
        assert_eq!(preorder_keys(&tree), vec![3, 1]);
    }

    #[test]
    fn test_remove_successor_deep_in_right_subtree() {
        let mut tree = tree_from(&[5, 3, 8, 1, 4, 7, 9, 6]);
        assert_eq!(tree.remove(&5), Some((5, 50)));
        assert_eq!(preorder_keys(&tree), vec![6, 3, 1, 4, 8, 7, 9]);
    }

    #[test]
    fn test_remove_two_children() {
        let mut tree = tree_from(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.remove(&3), Some((3, 30)));
        assert_eq!(preorder_keys(&tree), vec![5, 4, 1, 8, 7, 9]);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_remove_triggers_rotation() {
        let mut tree = tree_from(&[2, 1, 3, 4]);
        assert_eq!(tree.remove(&1), Some((1, 10)));
        assert_eq!(preorder_keys(&tree), vec![3, 2, 4]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_remove_prefers_single_rotation_on_tie() {
        let mut tree = tree_from(&[2, 1, 4, 3, 5]);
        assert_eq!(tree.remove(&1), Some((1, 10)));
        assert_eq!(preorder_keys(&tree), vec![4, 2, 3, 5]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_remove_rebalances_multiple_ancestors() {
        // a minimal avl tree of height 4 whose shallow side collapses on one removal
        let mut tree = tree_from(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.remove(&12), Some((12, 120)));
        assert_eq!(tree.height(), 3);
        assert_eq!(preorder_keys(&tree), vec![5, 3, 2, 1, 4, 8, 7, 6, 10, 9, 11]);
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = tree_from(&[2, 1, 3]);
        assert_eq!(tree.remove(&4), None);
        assert_eq!(preorder_keys(&tree), vec![2, 1, 3]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_remove_only_node() {
        let mut tree = tree_from(&[1]);
        assert_eq!(tree.remove(&1), Some((1, 10)));
        assert_eq!(tree.height(), -1);
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_floor_ceil_min_max() {
        let tree = tree_from(&[10, 20, 30, 40]);
        assert_eq!(tree.floor(&5), None);
        assert_eq!(tree.floor(&25), Some(&20));
        assert_eq!(tree.floor(&40), Some(&40));
        assert_eq!(tree.ceil(&25), Some(&30));
        assert_eq!(tree.ceil(&41), None);
        assert_eq!(tree.min(), Some((&10, &100)));
        assert_eq!(tree.max(), Some((&40, &400)));
    }

    #[test]
    fn test_in_order_iteration() {
        let tree = tree_from(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(tree.iter().map(|(key, _)| *key).collect::<Vec<u32>>(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            tree.into_iter().collect::<Vec<(u32, u32)>>(),
            vec![(1, 10), (2, 20), (3, 30), (4, 40), (5, 50), (6, 60), (7, 70)],
        );
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_from(&[1, 2, 3]);
        tree.clear();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), -1);
        assert!(tree.insert(1, 1));
        tree.check_invariants();
    }
}
