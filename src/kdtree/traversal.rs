//! Utilities to traverse the KDTree structure.

use std::fmt;
use std::iter::FusedIterator;

use crate::point::Point;
use crate::r#type::IndexableNum;

/// A single stored entry. Each node exclusively owns its children.
pub(crate) struct TreeNode<const D: usize, V, N: IndexableNum> {
    pub(crate) point: Point<D, N>,
    pub(crate) value: V,
    pub(crate) left: Option<Box<TreeNode<D, V, N>>>,
    pub(crate) right: Option<Box<TreeNode<D, V, N>>>,
}

impl<const D: usize, V, N: IndexableNum> TreeNode<D, V, N> {
    pub(crate) fn new(point: Point<D, N>, value: V) -> Self {
        Self {
            point,
            value,
            left: None,
            right: None,
        }
    }
}

/// A read-only view onto a node in the KDTree.
///
/// Each node stores one point and splits space along the axis `depth % D`: every point in the
/// left subtree is strictly less than this node's point along that axis, and every point in the
/// right subtree is greater than or equal.
pub struct Node<'a, const D: usize, V, N: IndexableNum = f64> {
    node: &'a TreeNode<D, V, N>,
    depth: usize,
}

impl<'a, const D: usize, V, N: IndexableNum> Node<'a, D, V, N> {
    pub(crate) fn new(node: &'a TreeNode<D, V, N>, depth: usize) -> Self {
        Self { node, depth }
    }

    /// The point stored at this node.
    #[inline]
    pub fn point(&self) -> &'a Point<D, N> {
        &self.node.point
    }

    /// The value associated with this node's point.
    #[inline]
    pub fn value(&self) -> &'a V {
        &self.node.value
    }

    /// The depth of this node, where the root has depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The axis that the children of this node are split over.
    #[inline]
    pub fn axis(&self) -> usize {
        self.depth % D
    }

    /// The child holding points strictly less than this node's point along [`Node::axis`].
    pub fn left_child(&self) -> Option<Node<'a, D, V, N>> {
        self.node
            .left
            .as_deref()
            .map(|child| Node::new(child, self.depth + 1))
    }

    /// The child holding points greater than or equal to this node's point along
    /// [`Node::axis`].
    pub fn right_child(&self) -> Option<Node<'a, D, V, N>> {
        self.node
            .right
            .as_deref()
            .map(|child| Node::new(child, self.depth + 1))
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node.left.is_none() && self.node.right.is_none()
    }

    /// Returns `true` if `point` belongs in the left subtree of this node.
    #[inline]
    pub(crate) fn goes_left(&self, point: &Point<D, N>) -> bool {
        let axis = self.axis();
        point[axis] < self.node.point[axis]
    }

    /// Split the children of this node into the one a descent towards `point` would take and
    /// the other one.
    pub(crate) fn near_far(&self, point: &Point<D, N>) -> NearFar<'a, D, V, N> {
        if self.goes_left(point) {
            (self.left_child(), self.right_child())
        } else {
            (self.right_child(), self.left_child())
        }
    }
}

pub(crate) type NearFar<'a, const D: usize, V, N> =
    (Option<Node<'a, D, V, N>>, Option<Node<'a, D, V, N>>);

// Manual impls: deriving would require `V: Clone`
impl<const D: usize, V, N: IndexableNum> Clone for Node<'_, D, V, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const D: usize, V, N: IndexableNum> Copy for Node<'_, D, V, N> {}

impl<const D: usize, V: fmt::Debug, N: IndexableNum> fmt::Debug for Node<'_, D, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("point", self.point())
            .field("value", self.value())
            .field("depth", &self.depth)
            .finish()
    }
}

/// A pre-order iterator over the entries of a KDTree.
///
/// Created by [`KDTreeIndex::iter`][crate::kdtree::KDTreeIndex::iter].
pub struct Iter<'a, const D: usize, V, N: IndexableNum = f64> {
    stack: Vec<Node<'a, D, V, N>>,
    remaining: usize,
}

impl<'a, const D: usize, V, N: IndexableNum> Iter<'a, D, V, N> {
    pub(crate) fn new(root: Option<Node<'a, D, V, N>>, len: usize) -> Self {
        Self {
            stack: root.into_iter().collect(),
            remaining: len,
        }
    }
}

impl<'a, const D: usize, V, N: IndexableNum> Iterator for Iter<'a, D, V, N> {
    type Item = (&'a Point<D, N>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Pushed in backwards order to what gets popped
        self.stack.extend(node.right_child());
        self.stack.extend(node.left_child());
        self.remaining = self.remaining.saturating_sub(1);
        Some((node.point(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const D: usize, V, N: IndexableNum> ExactSizeIterator for Iter<'_, D, V, N> {}

impl<const D: usize, V, N: IndexableNum> FusedIterator for Iter<'_, D, V, N> {}

impl<const D: usize, V, N: IndexableNum> fmt::Debug for Iter<'_, D, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}
