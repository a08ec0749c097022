use crate::bst_node::{extreme, Linked, NodeId, Nodes, Side};
use crate::BstMap;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Index;

mod private {
    pub trait Sealed {}
}

/// Direction of travel of a [`Position`] or cursor.
///
/// Implemented only by [`Forward`] (ascending key order) and [`Reverse`]
/// (descending key order).
pub trait Direction: private::Sealed + Copy + Eq + fmt::Debug {
    /// Whether stepping "next" walks towards smaller keys.
    const REVERSED: bool;
}

/// Ascending key order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Forward;

/// Descending key order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reverse;

impl private::Sealed for Forward {}
impl private::Sealed for Reverse {}

impl Direction for Forward {
    const REVERSED: bool = false;
}

impl Direction for Reverse {
    const REVERSED: bool = true;
}

// The side a step in direction D descends into first.
fn ahead<D: Direction>() -> Side {
    if D::REVERSED {
        Side::Left
    } else {
        Side::Right
    }
}

/// One in-order step from `id` towards `side`: `Side::Right` gives the
/// successor, `Side::Left` the predecessor. `None` once the walk runs off
/// the end of the tree.
pub(super) fn step<T>(nodes: &T, id: NodeId, side: Side) -> Option<NodeId>
where
    T: Index<NodeId> + ?Sized,
    T::Output: Linked,
{
    if let Some(child) = nodes[id].child(side) {
        return Some(extreme(nodes, child, side.opposite()));
    }
    // Climb while we are the `side` child; the first ancestor reached from
    // the other side is the answer.
    let mut current = id;
    let mut parent = nodes[id].parent();
    while let Some(p) = parent {
        if nodes[p].child(side) != Some(current) {
            break;
        }
        current = p;
        parent = nodes[p].parent();
    }
    parent
}

/// A position in a [`BstMap`]: either an element or the end sentinel.
///
/// Positions are plain handles. They borrow nothing, so they can be held
/// across mutation of the map, but a position whose element has been erased
/// is stale and must not be used again. `Position<Forward>` and
/// `Position<Reverse>` are distinct types and do not convert into each other.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position<D: Direction> {
    node: Option<NodeId>,
    direction: PhantomData<D>,
}

impl<D: Direction> Position<D> {
    pub(super) fn new(node: Option<NodeId>) -> Self {
        Position {
            node,
            direction: PhantomData,
        }
    }

    pub(super) fn end() -> Self {
        Self::new(None)
    }

    /// Returns true if this is the end sentinel value itself.
    ///
    /// A stale position is not the sentinel, but the map reads it as one:
    /// [`BstMap::entry_at`] gives `None` for it and a cursor placed on it
    /// reports [`Cursor::is_end`].
    pub fn is_end(self) -> bool {
        self.node.is_none()
    }

    // The referenced slot, if it is still occupied. A vacant slot reads as
    // the end sentinel.
    pub(super) fn live<K, V>(self, nodes: &Nodes<K, V>) -> Option<NodeId> {
        self.node.filter(|&id| nodes.contains(id))
    }

    pub(super) fn next<K, V>(self, nodes: &Nodes<K, V>) -> Self {
        match self.live(nodes) {
            Some(id) => Self::new(step(nodes, id, ahead::<D>())),
            None => Self::end(),
        }
    }

    pub(super) fn prev<K, V>(self, nodes: &Nodes<K, V>) -> Self {
        match self.live(nodes) {
            Some(id) => Self::new(step(nodes, id, ahead::<D>().opposite())),
            None => Self::end(),
        }
    }
}

impl<D: Direction> fmt::Debug for Position<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if D::REVERSED { "Reverse" } else { "Forward" };
        match self.node {
            Some(id) => write!(f, "Position<{}>({})", direction, id),
            None => write!(f, "Position<{}>(end)", direction),
        }
    }
}

/// Read-only cursor over a [`BstMap`].
///
/// `Cursor<_, _, _, Forward>` and `Cursor<_, _, _, Reverse>` are the const
/// iterator kinds; [`CursorMut`] is the mutable pair and widens into this
/// type with `From`.
pub struct Cursor<'a, K, V, C, D: Direction> {
    map: &'a BstMap<K, V, C>,
    position: Position<D>,
}

impl<'a, K, V, C, D: Direction> Cursor<'a, K, V, C, D> {
    pub(super) fn new(map: &'a BstMap<K, V, C>, position: Position<D>) -> Self {
        Cursor { map, position }
    }

    /// The position the cursor is at.
    pub fn position(&self) -> Position<D> {
        self.position
    }

    /// Returns true if the cursor sits on the end sentinel.
    pub fn is_end(&self) -> bool {
        self.position.live(&self.map.nodes).is_none()
    }

    /// The entry under the cursor, `None` on the end sentinel.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.map.entry_at(self.position)
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&'a K> {
        self.get().map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&'a V> {
        self.get().map(|(_, v)| v)
    }

    /// Steps one element in the cursor's direction. From the last element
    /// this reaches the end sentinel, which then stays put.
    pub fn move_next(&mut self) {
        self.position = self.position.next(&self.map.nodes);
    }

    /// Steps one element against the cursor's direction.
    pub fn move_prev(&mut self) {
        self.position = self.position.prev(&self.map.nodes);
    }
}

impl<K, V, C, D: Direction> Clone for Cursor<'_, K, V, C, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C, D: Direction> Copy for Cursor<'_, K, V, C, D> {}

impl<K, V, C, D: Direction> PartialEq for Cursor<'_, K, V, C, D> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.map, other.map) && self.position == other.position
    }
}

impl<K, V, C, D: Direction> Eq for Cursor<'_, K, V, C, D> {}

impl<K: fmt::Debug, V: fmt::Debug, C, D: Direction> fmt::Debug for Cursor<'_, K, V, C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

/// Read-write cursor over a [`BstMap`]: can update values in place and
/// erase the element it sits on.
pub struct CursorMut<'a, K, V, C, D: Direction> {
    map: &'a mut BstMap<K, V, C>,
    position: Position<D>,
}

impl<'a, K, V, C, D: Direction> CursorMut<'a, K, V, C, D> {
    pub(super) fn new(map: &'a mut BstMap<K, V, C>, position: Position<D>) -> Self {
        CursorMut { map, position }
    }

    /// The position the cursor is at.
    pub fn position(&self) -> Position<D> {
        self.position
    }

    /// Returns true if the cursor sits on the end sentinel.
    pub fn is_end(&self) -> bool {
        self.position.live(&self.map.nodes).is_none()
    }

    /// The entry under the cursor, `None` on the end sentinel.
    pub fn get(&self) -> Option<(&K, &V)> {
        self.map.entry_at(self.position)
    }

    /// The entry under the cursor with its value writable.
    pub fn get_mut(&mut self) -> Option<(&K, &mut V)> {
        self.map.entry_at_mut(self.position)
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&K> {
        self.get().map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&V> {
        self.get().map(|(_, v)| v)
    }

    /// The value under the cursor, writable.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.get_mut().map(|(_, v)| v)
    }

    /// Steps one element in the cursor's direction.
    pub fn move_next(&mut self) {
        self.position = self.position.next(&self.map.nodes);
    }

    /// Steps one element against the cursor's direction.
    pub fn move_prev(&mut self) {
        self.position = self.position.prev(&self.map.nodes);
    }

    /// Erases the element under the cursor and moves on to the element that
    /// followed it in the cursor's direction. Returns `None` and does
    /// nothing on the end sentinel.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let id = self.position.live(&self.map.nodes)?;
        let next = step(&self.map.nodes, id, ahead::<D>());
        let entry = self.map.remove_node(id);
        self.position = Position::new(next);
        Some(entry)
    }

    /// A read-only cursor at the same position, borrowing from this one.
    pub fn as_cursor(&self) -> Cursor<'_, K, V, C, D> {
        Cursor::new(&*self.map, self.position)
    }
}

impl<'a, K, V, C, D: Direction> From<CursorMut<'a, K, V, C, D>> for Cursor<'a, K, V, C, D> {
    fn from(cursor: CursorMut<'a, K, V, C, D>) -> Self {
        Cursor::new(cursor.map, cursor.position)
    }
}

/// In-order iterator over the entries of a [`BstMap`].
pub struct Iter<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(nodes: &'a Nodes<K, V>, root: Option<NodeId>, len: usize) -> Self {
        Iter {
            nodes,
            front: root.map(|r| extreme(nodes, r, Side::Left)),
            back: root.map(|r| extreme(nodes, r, Side::Right)),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = step(self.nodes, id, Side::Right);
        let node = &self.nodes[id];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = step(self.nodes, id, Side::Left);
        let node = &self.nodes[id];
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// In-order iterator yielding mutable references to the values.
pub struct IterMut<'a, K, V> {
    // Indexed by slot, vacant slots included. The walk runs on the copied
    // links while the entries are lent out, each at most once.
    slots: Vec<Slot<'a, K, V>>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

struct Slot<'a, K, V> {
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    entry: Option<(&'a K, &'a mut V)>,
}

impl<K, V> Slot<'_, K, V> {
    fn vacant() -> Self {
        Slot {
            left: None,
            right: None,
            parent: None,
            entry: None,
        }
    }
}

impl<K, V> Linked for Slot<'_, K, V> {
    fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(nodes: &'a mut Nodes<K, V>, root: Option<NodeId>) -> Self {
        let remaining = nodes.len();
        let mut slots = Vec::with_capacity(remaining);
        // Slab iteration is in ascending slot order.
        for (id, node) in nodes.iter_mut() {
            slots.resize_with(id, Slot::vacant);
            slots.push(Slot {
                left: node.left,
                right: node.right,
                parent: node.parent,
                entry: Some((&node.key, &mut node.value)),
            });
        }
        IterMut {
            front: root.map(|r| extreme(&slots, r, Side::Left)),
            back: root.map(|r| extreme(&slots, r, Side::Right)),
            slots,
            remaining,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = step(&self.slots, id, Side::Right);
        self.slots[id].entry.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = step(&self.slots, id, Side::Left);
        self.slots[id].entry.take()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning in-order iterator; drains the map from both ends.
pub struct IntoIter<K, V, C> {
    map: BstMap<K, V, C>,
}

impl<K, V, C> IntoIter<K, V, C> {
    pub(super) fn new(map: BstMap<K, V, C>) -> Self {
        IntoIter { map }
    }

    fn pop(&mut self, side: Side) -> Option<(K, V)> {
        let root = self.map.root?;
        let id = extreme(&self.map.nodes, root, side);
        Some(self.map.remove_node(id))
    }
}

impl<K, V, C> Iterator for IntoIter<K, V, C> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.pop(Side::Left)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len(), Some(self.map.len()))
    }
}

impl<K, V, C> DoubleEndedIterator for IntoIter<K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.pop(Side::Right)
    }
}

impl<K, V, C> ExactSizeIterator for IntoIter<K, V, C> {}

impl<K, V, C> FusedIterator for IntoIter<K, V, C> {}

#[cfg(test)]
mod tests {
    use crate::{BstMap, Cursor, Forward, Position, Reverse};

    fn sample() -> BstMap<u32, &'static str> {
        // Shape:      4
        //           /   \
        //          2     6
        //         / \   / \
        //        1   3 5   7
        [
            (4, "four"),
            (2, "two"),
            (6, "six"),
            (1, "one"),
            (3, "three"),
            (5, "five"),
            (7, "seven"),
        ]
        .into()
    }

    fn walk<D: crate::Direction>(mut cursor: Cursor<'_, u32, &str, impl Sized, D>) -> Vec<u32> {
        let mut keys = Vec::new();
        while let Some(k) = cursor.key() {
            keys.push(*k);
            cursor.move_next();
        }
        keys
    }

    #[test]
    fn test_forward_cursor_walks_in_order() {
        let map = sample();
        assert_eq!(walk(map.cursor(map.begin())), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_reverse_cursor_walks_backwards() {
        let map = sample();
        assert_eq!(walk(map.cursor(map.rbegin())), vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_move_prev_is_predecessor() {
        let map = sample();
        let mut cursor = map.cursor(map.find(&5));
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&4));
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&3));

        let mut reverse = map.cursor(map.rbegin());
        reverse.move_next();
        assert_eq!(reverse.key(), Some(&6));
        reverse.move_prev();
        assert_eq!(reverse.key(), Some(&7));
        reverse.move_prev();
        assert!(reverse.is_end());
    }

    #[test]
    fn test_end_sentinel_stays_put() {
        let map = sample();
        let mut cursor = map.cursor(map.end());
        assert!(cursor.is_end());
        assert_eq!(cursor.get(), None);
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.move_prev();
        assert_eq!(cursor.position(), map.end());
    }

    #[test]
    fn test_position_equality() {
        let map = sample();
        let mut begin = map.begin();
        assert_eq!(begin, map.find(&1));
        begin = begin.next(&map.nodes);
        assert_eq!(begin, map.find(&2));
        assert_ne!(begin, map.end());
        assert_eq!(map.end(), Position::<Forward>::end());
        assert_eq!(map.rend(), Position::<Reverse>::end());
        assert!(map.end().is_end());
    }

    #[test]
    fn test_cursor_equality() {
        let map = sample();
        let a = map.cursor(map.find(&3));
        let mut b = map.cursor(map.find(&2));
        assert_ne!(a, b);
        b.move_next();
        assert_eq!(a, b);

        let other = sample();
        assert_ne!(a, other.cursor(other.find(&3)));
    }

    #[test]
    fn test_cursor_mut_updates_values() {
        let mut map: BstMap<u32, u32> = (1..=5).map(|i| (i, i)).collect();
        let begin = map.begin();
        let mut cursor = map.cursor_mut(begin);
        while let Some(v) = cursor.value_mut() {
            *v *= 10;
            cursor.move_next();
        }
        assert_eq!(
            map.iter().map(|(_, v)| *v).collect::<Vec<_>>(),
            vec![10, 20, 30, 40, 50]
        );
    }

    #[test]
    fn test_cursor_mut_widens_to_cursor() {
        let mut map = sample();
        let rbegin = map.rbegin();
        let mut cursor = map.cursor_mut(rbegin);
        cursor.move_next();
        if let Some(v) = cursor.value_mut() {
            *v = "SIX";
        }
        assert_eq!(cursor.as_cursor().value(), Some(&"SIX"));

        let mut read_only: Cursor<'_, u32, &str, _, Reverse> = cursor.into();
        assert_eq!(read_only.key(), Some(&6));
        read_only.move_next();
        assert_eq!(read_only.get(), Some((&5, &"five")));
    }

    #[test]
    fn test_remove_current_forward() {
        let mut map = sample();
        let pos = map.find(&4);
        let mut cursor = map.cursor_mut(pos);
        assert_eq!(cursor.remove_current(), Some((4, "four")));
        assert_eq!(cursor.key(), Some(&5));
        assert_eq!(cursor.remove_current(), Some((5, "five")));
        assert_eq!(cursor.key(), Some(&6));
        assert_eq!(map.len(), 5);
        assert_eq!(
            map.keys().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 6, 7]
        );
    }

    #[test]
    fn test_remove_current_reverse() {
        let mut map = sample();
        let rbegin = map.rbegin();
        let mut cursor = map.cursor_mut(rbegin);
        let mut removed = Vec::new();
        while let Some((k, _)) = cursor.remove_current() {
            removed.push(k);
        }
        assert!(cursor.is_end());
        assert_eq!(removed, vec![7, 6, 5, 4, 3, 2, 1]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_iter_both_ends() {
        let map = sample();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some((&1, &"one")));
        assert_eq!(iter.next_back(), Some((&7, &"seven")));
        assert_eq!(iter.len(), 5);
        let middle: Vec<_> = iter.map(|(k, _)| *k).collect();
        assert_eq!(middle, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_iter_meets_in_the_middle() {
        let map = sample();
        let mut iter = map.iter();
        let mut seen = Vec::new();
        loop {
            match (iter.next(), iter.next_back()) {
                (Some((a, _)), Some((b, _))) => {
                    seen.push(*a);
                    seen.push(*b);
                }
                (Some((a, _)), None) => seen.push(*a),
                _ => break,
            }
        }
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iter_mut_rev() {
        let mut map = sample();
        let mut order = Vec::new();
        for (k, v) in map.iter_mut().rev() {
            order.push(*k);
            *v = "x";
        }
        assert_eq!(order, vec![7, 6, 5, 4, 3, 2, 1]);
        assert!(map.values().all(|v| *v == "x"));
    }

    #[test]
    fn test_iter_mut_skips_vacant_slots() {
        let mut map = sample();
        map.erase_key(&2);
        map.erase_key(&6);
        let mut iter = map.iter_mut();
        assert_eq!(iter.len(), 5);
        let (k, v) = iter.next().unwrap();
        assert_eq!(*k, 1);
        *v = "front";
        let (k, v) = iter.next_back().unwrap();
        assert_eq!(*k, 7);
        *v = "back";
        assert_eq!(iter.len(), 3);
        let middle: Vec<_> = iter.by_ref().map(|(k, _)| *k).collect();
        assert_eq!(middle, vec![3, 4, 5]);
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
        assert_eq!(map.get(&1), Some(&"front"));
        assert_eq!(map.get(&7), Some(&"back"));
    }

    #[test]
    fn test_into_iter_drains_both_ends() {
        let map = sample();
        let mut iter = map.into_iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some((1, "one")));
        assert_eq!(iter.next_back(), Some((7, "seven")));
        let rest: Vec<_> = iter.map(|(k, _)| k).collect();
        assert_eq!(rest, vec![2, 3, 4, 5, 6]);
    }
}
