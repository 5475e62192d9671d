use std::collections::HashMap;
use std::hash::Hash;

use tinyvec::TinyVec;
use tracing::trace;

use crate::error::{KdIndexError, Result};
use crate::kdtree::traversal::{Iter, Node};
use crate::kdtree::KDTree;
use crate::point::Point;
use crate::r#type::IndexableNum;
use crate::selector::BoundedSelector;

/// A trait for searching and accessing data out of a KDTree.
///
/// Implementors provide the root of the tree and its size. All lookups and nearest-neighbor
/// searches are provided on top of those.
pub trait KDTreeIndex<const D: usize, V, N: IndexableNum = f64>: Sized {
    /// Access the root node of the KDTree for manual traversal, or `None` if the tree is empty.
    fn root(&self) -> Option<Node<'_, D, V, N>>;

    /// The number of points stored in this KDTree.
    fn len(&self) -> usize;

    /// Returns `true` if the tree holds no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dimension of the points stored in this KDTree.
    fn dimension(&self) -> usize {
        D
    }

    /// Find the node storing exactly `point`.
    fn find(&self, point: &Point<D, N>) -> Option<Node<'_, D, V, N>> {
        let mut current = self.root();
        while let Some(node) = current {
            if node.point() == point {
                return Some(node);
            }
            current = if node.goes_left(point) {
                node.left_child()
            } else {
                node.right_child()
            };
        }
        None
    }

    /// Returns `true` if `point` is stored in the tree.
    fn contains(&self, point: &Point<D, N>) -> bool {
        self.find(point).is_some()
    }

    /// The value associated with `point`, if any.
    fn get(&self, point: &Point<D, N>) -> Option<&V> {
        self.find(point).map(|node| node.value())
    }

    /// The value associated with `point`.
    ///
    /// Returns [`KdIndexError::NotFound`] if the point is not stored in the tree.
    fn at(&self, point: &Point<D, N>) -> Result<&V> {
        self.get(point).ok_or(KdIndexError::NotFound)
    }

    /// Iterate over all `(point, value)` entries in pre-order.
    fn iter(&self) -> Iter<'_, D, V, N> {
        Iter::new(self.root(), self.len())
    }

    /// Search the `k` entries closest to `point`, ordered by ascending Euclidean distance.
    ///
    /// If the tree holds fewer than `k` points, all of them are returned. Among points at
    /// equal distance, the one visited first during the search comes first.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    /// use kd_index::Point;
    ///
    /// let mut tree = KDTree::<2, &str>::new();
    /// tree.insert(Point::new([0., 0.]), "origin");
    /// tree.insert(Point::new([5., 5.]), "far");
    /// tree.insert(Point::new([1., 0.]), "near");
    ///
    /// let neighbors = tree.nearest_neighbors(&Point::new([0.9, 0.]), 2).unwrap();
    /// let values: Vec<_> = neighbors.iter().map(|n| *n.value).collect();
    /// assert_eq!(values, vec!["near", "origin"]);
    /// ```
    fn nearest_neighbors(
        &self,
        point: &Point<D, N>,
        k: usize,
    ) -> Result<Vec<Neighbor<'_, D, V, N>>> {
        let root = self.root().ok_or(KdIndexError::EmptyIndex)?;
        let (selector, _) = knn_search(root, point, k)?;

        Ok(selector
            .into_sorted_pairs()
            .into_iter()
            .map(|(node, distance)| Neighbor {
                point: node.point(),
                value: node.value(),
                distance,
            })
            .collect())
    }

    /// The single entry closest to `point`, or `None` if the tree is empty.
    fn nearest(&self, point: &Point<D, N>) -> Option<Neighbor<'_, D, V, N>> {
        // With k == 1 the only possible error is an empty tree
        self.nearest_neighbors(point, 1).ok()?.into_iter().next()
    }

    /// Classify `point` by the most common value among its `k` nearest neighbors.
    ///
    /// If the tree holds fewer than `k` points, all of them vote. When several values are
    /// equally common, the one belonging to the closest neighbor wins.
    ///
    /// Returns [`KdIndexError::EmptyIndex`] on an empty tree and
    /// [`KdIndexError::InvalidArgument`] if `k` is zero.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    /// use kd_index::Point;
    ///
    /// let tree: KDTree<1, char> = [
    ///     (Point::new([0.]), 'a'),
    ///     (Point::new([1.]), 'b'),
    ///     (Point::new([2.]), 'b'),
    ///     (Point::new([10.]), 'a'),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// assert_eq!(tree.knn_value(&Point::new([0.2]), 1).unwrap(), 'a');
    /// assert_eq!(tree.knn_value(&Point::new([0.2]), 3).unwrap(), 'b');
    /// ```
    fn knn_value(&self, point: &Point<D, N>, k: usize) -> Result<V>
    where
        V: Clone + Eq + Hash,
    {
        let neighbors = self.nearest_neighbors(point, k)?;
        majority(neighbors.iter().map(|n| n.value))
            .cloned()
            .ok_or(KdIndexError::EmptyIndex)
    }
}

impl<const D: usize, V, N: IndexableNum> KDTreeIndex<D, V, N> for KDTree<D, V, N> {
    fn root(&self) -> Option<Node<'_, D, V, N>> {
        self.root.as_deref().map(|node| Node::new(node, 0))
    }

    fn len(&self) -> usize {
        self.num_items
    }
}

/// One result of a nearest-neighbor search.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a, const D: usize, V, N: IndexableNum = f64> {
    /// The stored point
    pub point: &'a Point<D, N>,
    /// The value associated with the stored point
    pub value: &'a V,
    /// Euclidean distance from the query point
    pub distance: N,
}

/// A pending unit of work in the nearest-neighbor search.
#[derive(Debug)]
enum Step<'a, const D: usize, V, N: IndexableNum> {
    /// Offer this node, then search its subtree
    Visit(Node<'a, D, V, N>),
    /// Subtree on the far side of a splitting plane, with the distance to that plane
    Far(Node<'a, D, V, N>, N),
}

impl<const D: usize, V, N: IndexableNum> Clone for Step<'_, D, V, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const D: usize, V, N: IndexableNum> Copy for Step<'_, D, V, N> {}

/// Counters from one nearest-neighbor search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchStats {
    /// Nodes offered to the selector
    pub(crate) visited: usize,
    /// Far subtrees skipped without being visited
    pub(crate) pruned: usize,
}

/// Depth-first search for the `k` nodes closest to `point`.
///
/// The far side of a splitting plane is only evaluated once the near side has been fully
/// searched, and is skipped when the selector is full and the plane is at least as far as the
/// worst retained candidate.
pub(crate) fn knn_search<'a, const D: usize, V, N: IndexableNum>(
    root: Node<'a, D, V, N>,
    point: &Point<D, N>,
    k: usize,
) -> Result<(BoundedSelector<Node<'a, D, V, N>, N>, SearchStats)> {
    let mut selector = BoundedSelector::new(k)?;

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[Option<Step<'a, D, V, N>>; 33]> = TinyVec::new();
    stack.push(Some(Step::Visit(root)));

    let mut stats = SearchStats::default();

    while let Some(step) = stack.pop().flatten() {
        match step {
            Step::Visit(node) => {
                stats.visited += 1;
                selector.offer(node, point.distance(node.point()));

                let (near, far) = node.near_far(point);
                // Note: the far side is pushed first so it is popped after the near subtree
                if let Some(far) = far {
                    let axis = node.axis();
                    let plane_dist = (point[axis] - node.point()[axis]).abs();
                    stack.push(Some(Step::Far(far, plane_dist)));
                }
                if let Some(near) = near {
                    stack.push(Some(Step::Visit(near)));
                }
            }
            Step::Far(far, plane_dist) => {
                if !selector.is_full() || plane_dist < selector.worst() {
                    stack.push(Some(Step::Visit(far)));
                } else {
                    stats.pruned += 1;
                }
            }
        }
    }

    trace!(
        k,
        visited = stats.visited,
        pruned = stats.pruned,
        "k-nearest-neighbor search finished"
    );
    Ok((selector, stats))
}

/// The most frequent item, preferring the earliest one on ties.
pub(crate) fn majority<'a, V: Eq + Hash + 'a>(
    values: impl Iterator<Item = &'a V>,
) -> Option<&'a V> {
    // value -> (count, position of first occurrence)
    let mut counts: HashMap<&V, (usize, usize)> = HashMap::new();
    for (i, value) in values.enumerate() {
        counts.entry(value).or_insert((0, i)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (a_count, a_first)), (_, (b_count, b_first))| {
            a_count.cmp(b_count).then(b_first.cmp(a_first))
        })
        .map(|(value, _)| value)
}

#[cfg(test)]
mod test {
    use super::majority;

    #[test]
    fn majority_picks_most_frequent() {
        let values = ['a', 'b', 'b', 'a', 'b'];
        assert_eq!(majority(values.iter()), Some(&'b'));
    }

    #[test]
    fn majority_tie_prefers_first_seen() {
        let values = [3, 1, 1, 3, 2];
        assert_eq!(majority(values.iter()), Some(&3));
        let values = [1, 3, 3, 1];
        assert_eq!(majority(values.iter()), Some(&1));
    }

    #[test]
    fn majority_of_nothing() {
        let values: [u8; 0] = [];
        assert_eq!(majority(values.iter()), None);
    }
}
