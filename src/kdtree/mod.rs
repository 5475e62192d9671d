//! An implementation of a mutable, insertion-ordered K-D Tree with k-nearest-neighbor search.

#![warn(missing_docs)]

mod index;
mod r#trait;
mod traversal;

pub use index::KDTree;
pub use r#trait::{KDTreeIndex, Neighbor};
pub use traversal::{Iter, Node};
