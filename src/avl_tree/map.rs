use crate::avl_tree::tree::{IntoIter, Iter, Preorder, Tree};
use crate::avl_tree::DEFAULT_CHUNK_SIZE;
use crate::error::{Error, Result};
use std::borrow::Borrow;

/// An ordered map implemented using an avl tree.
///
/// An avl tree is a self-balancing binary search tree that maintains the invariant that the
/// heights of the two child subtrees of any node differ by at most one. Nodes live in an arena and
/// keep a link to their parent, so rebalancing after an insertion or a removal walks up from the
/// point of change instead of unwinding a recursion. Lookups, insertions and removals are all
/// logarithmic in the number of keys.
///
/// # Examples
/// ```
/// use avl_collections::avl_tree::AvlMap;
///
/// let mut map = AvlMap::new();
/// assert!(map.insert(0, 1));
/// assert!(map.insert(3, 4));
///
/// assert_eq!(map.find(&0), Some(&1));
/// assert_eq!(map.find(&1), None);
/// assert_eq!(map.size(), 2);
/// assert_eq!(map.height(), 1);
///
/// assert_eq!(map.min(), Some(&0));
/// assert_eq!(map.ceil(&2), Some(&3));
///
/// *map.get_mut(&0).unwrap() = 2;
/// assert_eq!(map.remove_entry(&0), Some((0, 2)));
/// assert!(!map.remove(&1));
/// ```
pub struct AvlMap<K, V> {
    tree: Tree<K, V>,
}

impl<K, V> AvlMap<K, V> {
    /// Constructs a new, empty `AvlMap<K, V>`.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = AvlMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `AvlMap<K, V>` whose nodes are allocated `chunk_size` at a time.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = AvlMap::with_chunk_size(64);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        AvlMap {
            tree: Tree::new(chunk_size),
        }
    }

    /// Returns the height of the tree. An empty map has height -1 and a map with a single key has
    /// height 0.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.height(), -1);
    /// map.insert(1, 1);
    /// assert_eq!(map.height(), 0);
    /// ```
    pub fn height(&self) -> i32 {
        self.tree.height()
    }

    /// Returns the number of key-value pairs in the map.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.size(), 1);
    /// ```
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    /// Same as `size`.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let map: AvlMap<u32, u32> = AvlMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns an iterator over the map in preorder: a node, then its left subtree, then its right
    /// subtree. Each call starts a fresh traversal.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(10, 'a');
    /// map.insert(20, 'b');
    /// map.insert(30, 'c');
    ///
    /// let keys: Vec<&u32> = map.preorder().map(|(key, _)| key).collect();
    /// assert_eq!(keys, vec![&20, &10, &30]);
    /// ```
    pub fn preorder(&self) -> Preorder<'_, K, V> {
        self.tree.preorder()
    }

    /// Collects the preorder traversal into a vector.
    pub fn to_vec_preorder(&self) -> Vec<(&K, &V)> {
        self.preorder().collect()
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }
}

impl<K, V> AvlMap<K, V>
where
    K: Ord,
{
    /// Inserts a key-value pair into the map. Returns `false` and leaves the map untouched if the
    /// key already exists.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert!(map.insert(1, 1));
    /// assert!(!map.insert(1, 2));
    /// assert_eq!(map.find(&1), Some(&1));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.tree.insert(key, value)
    }

    /// Inserts a key-value pair coming from a source where either part may be missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKey` or `Error::MissingValue` without touching the map if the
    /// corresponding argument is `None`.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    /// use avl_collections::Error;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.try_insert(Some(1), Some("one")), Ok(true));
    /// assert_eq!(map.try_insert(None, Some("two")), Err(Error::MissingKey));
    /// assert_eq!(map.try_insert(Some(2), None), Err(Error::MissingValue));
    /// assert_eq!(map.size(), 1);
    /// ```
    pub fn try_insert(&mut self, key: Option<K>, value: Option<V>) -> Result<bool> {
        let key = key.ok_or(Error::MissingKey)?;
        let value = value.ok_or(Error::MissingValue)?;
        Ok(self.insert(key, value))
    }

    /// Removes a key from the map. Returns `true` if the key was present.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert!(map.remove(&1));
    /// assert!(!map.remove(&1));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key).is_some()
    }

    /// Removes a key from the map. If the key exists in the map, it will return the associated
    /// key-value pair. Otherwise it will return `None`.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove_entry(&1), Some((1, 1)));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key)
    }

    /// Removes a possibly missing key from the map.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKey` if `key` is `None`.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    /// use avl_collections::Error;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.try_remove(Some(&1)), Ok(true));
    /// assert_eq!(map.try_remove(None::<&u32>), Err(Error::MissingKey));
    /// ```
    pub fn try_remove<Q>(&mut self, key: Option<&Q>) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let key = key.ok_or(Error::MissingKey)?;
        Ok(self.remove(key))
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.find(&0), None);
    /// assert_eq!(map.find(&1), Some(&1));
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Looks up a possibly missing key.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKey` if `key` is `None`.
    pub fn try_find<Q>(&self, key: Option<&Q>) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let key = key.ok_or(Error::MissingKey)?;
        Ok(self.find(key))
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.find(&1), Some(&2));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Returns a key in the map that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.floor(&0), None);
    /// assert_eq!(map.floor(&2), Some(&1));
    /// ```
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.floor(key)
    }

    /// Returns a key in the map that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.ceil(&0), Some(&1));
    /// assert_eq!(map.ceil(&2), None);
    /// ```
    pub fn ceil<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.ceil(key)
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&K> {
        self.tree.min().map(|(key, _)| key)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::avl_tree::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&K> {
        self.tree.max().map(|(key, _)| key)
    }

    /// Panics if the tree violates key order, parent links, cached heights or balance anywhere.
    /// Linear in the size of the map.
    pub fn check_invariants(&self) {
        self.tree.check_invariants();
    }
}

impl<K, V> IntoIterator for AvlMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V>
where
    K: 'a,
    V: 'a,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
