//! An ordered map backed by a plain (unbalanced) binary search tree.
//!
//! Nodes live in an arena and carry parent links, so positions can walk the
//! tree in both directions without any auxiliary stack.
#![warn(missing_docs)]

use compare::Compare;
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

mod bst_iter;
mod bst_node;
mod error;
pub mod team;

pub use bst_iter::{Cursor, CursorMut, Direction, Forward, IntoIter, Iter, IterMut, Position, Reverse};
pub use error::{Error, Result};

use bst_iter::step;
use bst_node::{extreme, Linked, Node, NodeId, Nodes, Side};

/// The default comparator: `Ord` on the keys.
///
/// Any borrowed form `Q` of a key can be compared against stored keys, so a
/// map keyed by `String` can be searched with a `&str`. As with
/// [`std::collections::BTreeMap`], `Q`'s order must agree with `K`'s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyOrder;

impl<Q, K> Compare<Q, K> for KeyOrder
where
    Q: Ord + ?Sized,
    K: Borrow<Q>,
{
    fn compare(&self, l: &Q, r: &K) -> Ordering {
        l.cmp(r.borrow())
    }
}

/// An ordered map over a binary search tree, keyed under the comparator `C`.
///
/// The tree is not rebalanced: inserting keys in sorted order builds a
/// linked list and makes lookups linear.
///
/// Lookups take any `Q` the comparator can compare against `K`
/// (`C: Compare<Q, K>`); inserts need `C: Compare<K>`.
#[derive(Clone)]
pub struct BstMap<K, V, C = KeyOrder> {
    nodes: Nodes<K, V>,
    root: Option<NodeId>,
    length: usize,
    cmp: C,
}

enum SearchResult {
    Found(NodeId),
    // Empty slot under `parent` (None for an empty tree) on `side`.
    Vacant { parent: Option<NodeId>, side: Side },
}

use SearchResult::*;

impl<K: Ord, V> BstMap<K, V> {
    /// Creates an empty map ordered by `K`'s natural order.
    pub fn new() -> Self {
        Self::with_comparator(KeyOrder)
    }
}

impl<K, V, C> BstMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        BstMap {
            nodes: Nodes::new(),
            root: None,
            length: 0,
            cmp,
        }
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The comparator the map is ordered by.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Position of the smallest key, or `end()` for an empty map.
    pub fn begin(&self) -> Position<Forward> {
        Position::new(self.root.map(|r| extreme(&self.nodes, r, Side::Left)))
    }

    /// The forward end sentinel.
    pub fn end(&self) -> Position<Forward> {
        Position::end()
    }

    /// Position of the largest key, the start of a reverse walk.
    pub fn rbegin(&self) -> Position<Reverse> {
        Position::new(self.root.map(|r| extreme(&self.nodes, r, Side::Right)))
    }

    /// The reverse end sentinel.
    pub fn rend(&self) -> Position<Reverse> {
        Position::end()
    }

    /// The entry at `position`, or `None` for the end sentinel.
    pub fn entry_at<D: Direction>(&self, position: Position<D>) -> Option<(&K, &V)> {
        let node = &self.nodes[position.live(&self.nodes)?];
        Some((&node.key, &node.value))
    }

    /// The entry at `position` with its value writable.
    pub fn entry_at_mut<D: Direction>(&mut self, position: Position<D>) -> Option<(&K, &mut V)> {
        let id = position.live(&self.nodes)?;
        let node = &mut self.nodes[id];
        Some((&node.key, &mut node.value))
    }

    /// A read-only cursor at `position`.
    pub fn cursor<D: Direction>(&self, position: Position<D>) -> Cursor<'_, K, V, C, D> {
        Cursor::new(self, position)
    }

    /// A read-write cursor at `position`.
    pub fn cursor_mut<D: Direction>(&mut self, position: Position<D>) -> CursorMut<'_, K, V, C, D> {
        CursorMut::new(self, position)
    }

    /// The entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.begin())
    }

    /// The entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.rbegin())
    }

    /// Removes the element at `position` and returns the position of the
    /// element that followed it in key order, or `end()` if it was the last.
    /// Erasing `end()` does nothing.
    ///
    /// Every other position referring to the erased element becomes stale.
    pub fn erase(&mut self, position: Position<Forward>) -> Position<Forward> {
        let Some(id) = position.live(&self.nodes) else {
            return self.end();
        };
        let next = step(&self.nodes, id, Side::Right);
        self.remove_node(id);
        Position::new(next)
    }

    /// Erases `[first, last)` one element at a time and returns `begin()` of
    /// the map that is left, not the position after the erased range.
    pub fn erase_range(&mut self, mut first: Position<Forward>, last: Position<Forward>) -> Position<Forward> {
        let before = self.length;
        while first != last && first.live(&self.nodes).is_some() {
            first = self.erase(first);
        }
        trace!("erase_range removed {} of {} elements", before - self.length, before);
        self.begin()
    }

    /// Removes every element, children before parents.
    pub fn clear(&mut self) {
        trace!("clearing {} elements", self.length);
        let mut current = self.root.take();
        while let Some(id) = current {
            let node = &self.nodes[id];
            if !node.is_leaf() {
                current = node.left.or(node.right);
                continue;
            }
            let parent = node.parent;
            self.nodes.remove(id);
            if let Some(p) = parent {
                let side = self.nodes[p].side_of(id);
                debug_assert!(side.is_some(), "parent link does not point back down");
                if let Some(side) = side {
                    self.nodes[p].set_child(side, None);
                }
            }
            current = parent;
        }
        debug_assert!(self.nodes.is_empty());
        self.length = 0;
    }

    /// Exchanges the contents and comparators of two maps without touching
    /// any node.
    pub fn swap(&mut self, other: &mut Self) {
        trace!("swapping maps of {} and {} elements", self.length, other.length);
        std::mem::swap(self, other);
    }

    /// An in-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root, self.length)
    }

    /// An in-order iterator with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.nodes, self.root)
    }

    /// The keys in order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// The values in key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Mutable references to the values in key order.
    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + ExactSizeIterator + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    fn attach(&mut self, parent: Option<NodeId>, side: Side, key: K, value: V) -> NodeId {
        let id = self.nodes.insert(Node::new(key, value, parent));
        match parent {
            None => self.root = Some(id),
            Some(p) => self.nodes[p].set_child(side, Some(id)),
        }
        self.length += 1;
        id
    }

    // Puts the subtree `v` where `u` hangs. `u`'s own links are left alone.
    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes[u].parent;
        match parent {
            None => self.root = v,
            Some(p) => {
                let side = self.nodes[p].side_of(u);
                debug_assert!(side.is_some(), "parent link does not point back down");
                if let Some(side) = side {
                    self.nodes[p].set_child(side, v);
                }
            }
        }
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    // Unhooks `z` from the tree, keeping every other node in order. The
    // replacement for a node with two children is always the leftmost node
    // of its right subtree.
    fn unlink(&mut self, z: NodeId) {
        let (left, right) = (self.nodes[z].left, self.nodes[z].right);
        match (left, right) {
            (None, _) => self.transplant(z, right),
            (Some(_), None) => self.transplant(z, left),
            (Some(l), Some(r)) => {
                let y = extreme(&self.nodes, r, Side::Left);
                if self.nodes[y].parent != Some(z) {
                    let y_right = self.nodes[y].right;
                    self.transplant(y, y_right);
                    self.nodes[y].right = Some(r);
                    self.nodes[r].parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.nodes[y].left = Some(l);
                self.nodes[l].parent = Some(y);
            }
        }
    }

    fn remove_node(&mut self, id: NodeId) -> (K, V) {
        self.unlink(id);
        let node = self.nodes.remove(id);
        self.length -= 1;
        (node.key, node.value)
    }
}

impl<K, V, C> BstMap<K, V, C>
where
    C: Compare<K>,
{
    /// Builds a map from `iter` ordered by `cmp`. When a key repeats, the
    /// first value wins.
    pub fn from_iter_with<I>(iter: I, cmp: C) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_comparator(cmp);
        map.extend(iter);
        map
    }

    fn search<Q: ?Sized>(&self, key: &Q) -> SearchResult
    where
        C: Compare<Q, K>,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            side = match Compare::<Q, K>::compare(&self.cmp, key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Found(id),
            };
            parent = Some(id);
            current = node.child(side);
        }
        Vacant { parent, side }
    }

    fn find_node<Q: ?Sized>(&self, key: &Q) -> Option<NodeId>
    where
        C: Compare<Q, K>,
    {
        match self.search(key) {
            Found(id) => Some(id),
            Vacant { .. } => None,
        }
    }

    /// Inserts `key` with `value` unless an equal key is already present.
    ///
    /// Returns the position of the element with that key and whether a new
    /// element was created. An existing value is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> (Position<Forward>, bool) {
        match self.search(&key) {
            Found(id) => (Position::new(Some(id)), false),
            Vacant { parent, side } => {
                let id = self.attach(parent, side, key, value);
                (Position::new(Some(id)), true)
            }
        }
    }

    /// The value under `key`, inserting `V::default()` first if the key is
    /// absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let id = match self.search(&key) {
            Found(id) => id,
            Vacant { parent, side } => self.attach(parent, side, key, V::default()),
        };
        &mut self.nodes[id].value
    }

    /// Position of `key`, or `end()` if it is absent.
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Position<Forward>
    where
        C: Compare<Q, K>,
    {
        Position::new(self.find_node(key))
    }

    /// Returns a reference to the value under `key`.
    ///
    /// The key may be any borrowed form the comparator accepts.
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        C: Compare<Q, K>,
    {
        let id = self.find_node(key)?;
        Some(&self.nodes[id].value)
    }

    /// Returns a mutable reference to the value under `key`.
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        C: Compare<Q, K>,
    {
        let id = self.find_node(key)?;
        Some(&mut self.nodes[id].value)
    }

    /// Checked access to the value under `key`.
    pub fn at<Q: ?Sized>(&self, key: &Q) -> Result<&V>
    where
        C: Compare<Q, K>,
    {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Checked mutable access to the value under `key`.
    pub fn at_mut<Q: ?Sized>(&mut self, key: &Q) -> Result<&mut V>
    where
        C: Compare<Q, K>,
    {
        self.get_mut(key).ok_or(Error::NotFound)
    }

    /// Returns true if the map holds `key`.
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        C: Compare<Q, K>,
    {
        self.find_node(key).is_some()
    }

    /// Number of elements under `key`: 0 or 1.
    pub fn count<Q: ?Sized>(&self, key: &Q) -> usize
    where
        C: Compare<Q, K>,
    {
        usize::from(self.contains_key(key))
    }

    /// Erases the element under `key`, returning how many were removed.
    pub fn erase_key<Q: ?Sized>(&mut self, key: &Q) -> usize
    where
        C: Compare<Q, K>,
    {
        match self.find_node(key) {
            Some(id) => {
                self.remove_node(id);
                1
            }
            None => 0,
        }
    }

    /// Removes `key` and hands back its value.
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        C: Compare<Q, K>,
    {
        let id = self.find_node(key)?;
        Some(self.remove_node(id).1)
    }
}

impl<K, V, C: Default> Default for BstMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for BstMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// Maps are equal when they hold the same entries in the same order; the
// shape of the trees does not matter.
impl<K: PartialEq, V: PartialEq, C> PartialEq for BstMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for BstMap<K, V, C> {}

impl<K, V, C, Q: ?Sized> Index<&Q> for BstMap<K, V, C>
where
    C: Compare<K> + Compare<Q, K>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for BstMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BstMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with(iter, KeyOrder)
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BstMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a BstMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut BstMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for BstMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
