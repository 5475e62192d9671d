//! A fixed-capacity container retaining the `k` closest candidates offered to it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{KdIndexError, Result};
use crate::r#type::IndexableNum;

/// Tracks the `k` payloads with the smallest associated distance seen so far.
///
/// Once the selector is full, a new candidate is only kept if it is strictly closer than the
/// current worst candidate, which it then evicts. Candidates at equal distance are ordered by
/// arrival: the earlier one sorts first and the later one is considered worse.
///
/// ```
/// use kd_index::BoundedSelector;
///
/// let mut selector = BoundedSelector::new(2).unwrap();
/// selector.offer("far", 10.);
/// selector.offer("near", 1.);
/// selector.offer("middle", 5.);
/// assert_eq!(selector.worst(), 5.);
/// assert_eq!(selector.into_sorted_vec(), vec!["near", "middle"]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedSelector<T, N: IndexableNum = f64> {
    heap: BinaryHeap<Candidate<T, N>>,
    capacity: usize,
    /// Arrival counter used to order candidates at equal distance
    seq: usize,
}

impl<T, N: IndexableNum> BoundedSelector<T, N> {
    /// Create an empty selector retaining at most `capacity` candidates.
    ///
    /// Returns [`KdIndexError::InvalidArgument`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(KdIndexError::InvalidArgument(
                "selector capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            // The heap holds at most `capacity` items, but don't trust huge k for the allocation
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
            capacity,
            seq: 0,
        })
    }

    /// The maximum number of candidates retained.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of candidates currently retained.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no candidate has been retained yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns `true` once `capacity` candidates are retained.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.heap.len() == self.capacity
    }

    /// The largest retained distance, or positive infinity when empty.
    #[inline]
    pub fn worst(&self) -> N {
        self.heap.peek().map_or(N::infinity(), |c| c.dist)
    }

    /// Offer a candidate.
    ///
    /// Returns `true` if the candidate was retained.
    pub fn offer(&mut self, payload: T, dist: N) -> bool {
        let candidate = Candidate {
            payload,
            dist,
            seq: self.seq,
        };
        self.seq += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(candidate);
            return true;
        }

        // Full: replace the worst in place, the heap restores itself when `top` drops
        match self.heap.peek_mut() {
            Some(mut top) if dist < top.dist => {
                *top = candidate;
                true
            }
            _ => false,
        }
    }

    /// Consume the selector, returning the retained payloads from closest to farthest.
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| c.payload)
            .collect()
    }

    /// Consume the selector, returning the retained payloads along with their distances, from
    /// closest to farthest.
    pub fn into_sorted_pairs(self) -> Vec<(T, N)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.payload, c.dist))
            .collect()
    }
}

/// A wrapper around a payload and its distance for use in the priority queue.
#[derive(Debug, Clone)]
struct Candidate<T, N: IndexableNum> {
    payload: T,
    dist: N,
    seq: usize,
}

impl<T, N: IndexableNum> PartialEq for Candidate<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, N: IndexableNum> Eq for Candidate<T, N> {}

impl<T, N: IndexableNum> Ord for Candidate<T, N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN distances compare as equal and fall back to arrival order
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<T, N: IndexableNum> PartialOrd for Candidate<T, N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
