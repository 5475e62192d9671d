//! Shared helpers for tests across the crate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kdtree::{KDTree, KDTreeIndex, Node};
use crate::Point;

/// 100 distinct integer points in `[0, 100)^2`.
pub(crate) fn fixture_points() -> Vec<Point<2>> {
    #[rustfmt::skip]
    let coords: Vec<[i32; 2]> = vec![
        [54, 1], [97, 21], [65, 35], [33, 54], [95, 39],
        [54, 3], [53, 54], [84, 72], [33, 34], [43, 15],
        [52, 83], [81, 23], [1, 61], [38, 74], [11, 91],
        [24, 56], [90, 31], [25, 57], [46, 61], [29, 69],
        [49, 60], [4, 98], [71, 15], [60, 25], [38, 84],
        [52, 38], [94, 51], [13, 25], [77, 73], [88, 87],
        [6, 27], [58, 22], [53, 28], [27, 91], [96, 98],
        [93, 14], [22, 93], [45, 94], [18, 28], [35, 15],
        [19, 81], [20, 81], [67, 53], [43, 3], [47, 66],
        [48, 34], [46, 12], [32, 38], [43, 12], [39, 94],
        [88, 62], [66, 14], [84, 30], [72, 81], [41, 92],
        [26, 4], [6, 76], [47, 21], [57, 70], [71, 82],
        [50, 68], [96, 18], [40, 31], [78, 53], [71, 90],
        [32, 14], [55, 6], [32, 88], [62, 32], [21, 67],
        [73, 81], [44, 64], [29, 50], [70, 5], [6, 22],
        [68, 3], [11, 23], [20, 42], [21, 73], [63, 86],
        [9, 40], [99, 2], [99, 76], [56, 77], [83, 6],
        [21, 72], [78, 30], [75, 53], [41, 11], [95, 20],
        [30, 38], [96, 82], [65, 48], [33, 18], [87, 28],
        [10, 10], [40, 34], [10, 20], [47, 29], [46, 78],
    ];
    coords
        .into_iter()
        .map(|[x, y]| Point::new([x.into(), y.into()]))
        .collect()
}

/// `n` uniformly random points in `[-100, 100)^D`, reproducible from `seed`.
pub(crate) fn random_points<const D: usize>(n: usize, seed: u64) -> Vec<Point<D>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(std::array::from_fn(|_| rng.gen_range(-100.0..100.0))))
        .collect()
}

/// Distances of the `k` points closest to `query`, found by sorting every point.
pub(crate) fn brute_force_distances<const D: usize>(
    points: &[Point<D>],
    query: &Point<D>,
    k: usize,
) -> Vec<f64> {
    let mut dists: Vec<f64> = points.iter().map(|p| p.distance(query)).collect();
    dists.sort_by(|a, b| a.total_cmp(b));
    dists.truncate(k);
    dists
}

/// Build a tree mapping each point to its position in `points`.
pub(crate) fn index_tree<const D: usize>(points: &[Point<D>]) -> KDTree<D, usize> {
    points.iter().enumerate().map(|(i, p)| (*p, i)).collect()
}

/// Assert that every node splits its subtrees correctly along its axis, returning the number
/// of nodes checked.
pub(crate) fn assert_partitioned<const D: usize, V>(tree: &KDTree<D, V>) -> usize {
    fn subtree_points<const D: usize, V>(
        node: Option<Node<'_, D, V>>,
        out: &mut Vec<Point<D>>,
    ) {
        if let Some(node) = node {
            out.push(*node.point());
            subtree_points(node.left_child(), out);
            subtree_points(node.right_child(), out);
        }
    }

    let mut checked = 0;
    let mut stack: Vec<Node<'_, D, V>> = tree.root().into_iter().collect();
    while let Some(node) = stack.pop() {
        let axis = node.axis();
        assert_eq!(axis, node.depth() % D);
        let split = node.point()[axis];

        let mut left = vec![];
        subtree_points(node.left_child(), &mut left);
        for p in &left {
            assert!(p[axis] < split, "{:?} should be left of {:?}", p, node.point());
        }

        let mut right = vec![];
        subtree_points(node.right_child(), &mut right);
        for p in &right {
            assert!(p[axis] >= split, "{:?} should be right of {:?}", p, node.point());
        }

        stack.extend(node.left_child());
        stack.extend(node.right_child());
        checked += 1;
    }
    checked
}
