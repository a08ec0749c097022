use slab::Slab;
use std::ops::Index;

/// Index of a node slot in the map's arena.
pub(super) type NodeId = usize;

/// The arena every node of one map lives in.
pub(super) type Nodes<K, V> = Slab<Node<K, V>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

impl Side {
    pub(super) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// Child links own their subtree. `parent` is only a way back up: it is never
// followed to release a slot.
#[derive(Clone)]
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) left: Option<NodeId>,
    pub(super) right: Option<NodeId>,
    pub(super) parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(super) fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Node {
            key,
            value,
            left: None,
            right: None,
            parent,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub(super) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Which side of this node `child` hangs on, if it is a direct child.
    pub(super) fn side_of(&self, child: NodeId) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Read access to the links of anything laid out like a tree node.
pub(super) trait Linked {
    fn child(&self, side: Side) -> Option<NodeId>;
    fn parent(&self) -> Option<NodeId>;
}

impl<K, V> Linked for Node<K, V> {
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

/// Follows `side` links from `id` until there is none left: the leftmost or
/// rightmost node of the subtree rooted at `id`.
pub(super) fn extreme<T>(nodes: &T, mut id: NodeId, side: Side) -> NodeId
where
    T: Index<NodeId> + ?Sized,
    T::Output: Linked,
{
    while let Some(next) = nodes[id].child(side) {
        id = next;
    }
    id
}
