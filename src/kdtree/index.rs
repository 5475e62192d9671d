use std::fmt;
use std::ops::Index;

use crate::error::{KdIndexError, Result};
use crate::kdtree::r#trait::KDTreeIndex;
use crate::kdtree::traversal::{Iter, TreeNode};
use crate::point::Point;
use crate::r#type::IndexableNum;

type Link<const D: usize, V, N> = Option<Box<TreeNode<D, V, N>>>;

/// An owned, mutable KDTree mapping points to values.
///
/// Points are inserted one at a time and never rebalanced, so the shape of the tree depends on
/// insertion order. Each point is stored at most once: inserting an existing point overwrites
/// its value.
///
/// ```
/// use kd_index::kdtree::{KDTree, KDTreeIndex};
/// use kd_index::Point;
///
/// let mut tree = KDTree::<3, usize>::new();
/// tree.insert(Point::new([1., 0., 0.]), 0);
/// tree.insert(Point::new([0., 1., 0.]), 1);
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.at(&Point::new([0., 1., 0.])).unwrap(), &1);
/// assert!(!tree.contains(&Point::new([0., 0., 1.])));
///
/// *tree.get_or_insert_default(Point::new([0., 0., 1.])) += 2;
/// assert_eq!(tree[&Point::new([0., 0., 1.])], 2);
/// ```
pub struct KDTree<const D: usize, V, N: IndexableNum = f64> {
    pub(crate) root: Link<D, V, N>,
    pub(crate) num_items: usize,
}

impl<const D: usize, V, N: IndexableNum> KDTree<D, V, N> {
    const NONZERO_DIMENSION: () = assert!(D > 0, "KDTree dimension must be at least 1");

    /// Create an empty tree.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_DIMENSION;
        Self {
            root: None,
            num_items: 0,
        }
    }

    /// Insert `point` with `value`.
    ///
    /// If the point is already stored its value is overwritten in place, the size of the tree is
    /// unchanged and the previous value is returned. Otherwise a new leaf is created.
    pub fn insert(&mut self, point: Point<D, N>, value: V) -> Option<V> {
        let slot = find_slot(&mut self.root, &point);
        match slot {
            Some(node) => Some(std::mem::replace(&mut node.value, value)),
            None => {
                *slot = Some(Box::new(TreeNode::new(point, value)));
                self.num_items += 1;
                None
            }
        }
    }

    /// A mutable reference to the value associated with `point`, if any.
    pub fn get_mut(&mut self, point: &Point<D, N>) -> Option<&mut V> {
        find_slot(&mut self.root, point)
            .as_mut()
            .map(|node| &mut node.value)
    }

    /// A mutable reference to the value associated with `point`.
    ///
    /// Returns [`KdIndexError::NotFound`] if the point is not stored in the tree.
    pub fn at_mut(&mut self, point: &Point<D, N>) -> Result<&mut V> {
        self.get_mut(point).ok_or(KdIndexError::NotFound)
    }

    /// A mutable reference to the value associated with `point`, inserting the result of `f`
    /// first if the point is not stored yet.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, point: Point<D, N>, f: F) -> &mut V {
        let slot = find_slot(&mut self.root, &point);
        if slot.is_none() {
            self.num_items += 1;
        }
        &mut slot
            .get_or_insert_with(|| Box::new(TreeNode::new(point, f())))
            .value
    }

    /// A mutable reference to the value associated with `point`, inserting `V::default()` first
    /// if the point is not stored yet.
    pub fn get_or_insert_default(&mut self, point: Point<D, N>) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(point, V::default)
    }

    /// Remove every point from the tree.
    pub fn clear(&mut self) {
        drop_subtree(self.root.take());
        self.num_items = 0;
    }
}

/// Descend from `slot` to the link holding `point`, or to the empty link where it would be
/// inserted.
fn find_slot<'a, const D: usize, V, N: IndexableNum>(
    mut slot: &'a mut Link<D, V, N>,
    point: &Point<D, N>,
) -> &'a mut Link<D, V, N> {
    let mut axis = 0;
    loop {
        // Stop at the matching node or at the empty link
        if slot.as_ref().map_or(true, |node| node.point == *point) {
            return slot;
        }
        if let Some(node) = slot {
            slot = if point[axis] < node.point[axis] {
                &mut node.left
            } else {
                &mut node.right
            };
            axis = (axis + 1) % D;
        }
    }
}

/// Free a subtree with an explicit stack, so degenerate trees can't overflow the call stack.
fn drop_subtree<const D: usize, V, N: IndexableNum>(root: Link<D, V, N>) {
    let mut stack: Vec<Box<TreeNode<D, V, N>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        // Children are detached before their parent is freed
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

/// Deep-copy a subtree in post-order with an explicit stack.
fn clone_subtree<const D: usize, V: Clone, N: IndexableNum>(
    root: Option<&TreeNode<D, V, N>>,
) -> Link<D, V, N> {
    enum Step<'a, const D: usize, V, N: IndexableNum> {
        Enter(Option<&'a TreeNode<D, V, N>>),
        Build(&'a TreeNode<D, V, N>),
    }

    let mut stack = vec![Step::Enter(root)];
    // Finished copies; a node's two children sit on top when it is built
    let mut built: Vec<Link<D, V, N>> = vec![];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(None) => built.push(None),
            Step::Enter(Some(node)) => {
                // Note: these are pushed in backwards order to what gets popped
                stack.push(Step::Build(node));
                stack.push(Step::Enter(node.right.as_deref()));
                stack.push(Step::Enter(node.left.as_deref()));
            }
            Step::Build(node) => {
                let right = built.pop().flatten();
                let left = built.pop().flatten();
                built.push(Some(Box::new(TreeNode {
                    point: node.point,
                    value: node.value.clone(),
                    left,
                    right,
                })));
            }
        }
    }

    built.pop().flatten()
}

impl<const D: usize, V, N: IndexableNum> Default for KDTree<D, V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize, V: Clone, N: IndexableNum> Clone for KDTree<D, V, N> {
    fn clone(&self) -> Self {
        Self {
            root: clone_subtree(self.root.as_deref()),
            num_items: self.num_items,
        }
    }
}

impl<const D: usize, V, N: IndexableNum> Drop for KDTree<D, V, N> {
    fn drop(&mut self) {
        drop_subtree(self.root.take());
    }
}

impl<const D: usize, V: fmt::Debug, N: IndexableNum> fmt::Debug for KDTree<D, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Look up the value of a stored point.
///
/// # Panics
///
/// Panics if the point is not stored in the tree. Use [`KDTreeIndex::at`] to handle a missing
/// point, or [`KDTree::get_or_insert_default`] to insert it.
impl<const D: usize, V, N: IndexableNum> Index<&Point<D, N>> for KDTree<D, V, N> {
    type Output = V;

    fn index(&self, point: &Point<D, N>) -> &Self::Output {
        match self.get(point) {
            Some(value) => value,
            None => panic!("Point {:?} not found in tree", point),
        }
    }
}

impl<const D: usize, V, N: IndexableNum> Extend<(Point<D, N>, V)> for KDTree<D, V, N> {
    fn extend<T: IntoIterator<Item = (Point<D, N>, V)>>(&mut self, iter: T) {
        for (point, value) in iter {
            self.insert(point, value);
        }
    }
}

impl<const D: usize, V, N: IndexableNum> FromIterator<(Point<D, N>, V)> for KDTree<D, V, N> {
    fn from_iter<T: IntoIterator<Item = (Point<D, N>, V)>>(iter: T) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, const D: usize, V, N: IndexableNum> IntoIterator for &'a KDTree<D, V, N> {
    type Item = (&'a Point<D, N>, &'a V);
    type IntoIter = Iter<'a, D, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
