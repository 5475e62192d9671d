//! A fixed-dimension point value type.

use std::ops::{Index, IndexMut};

use geo_traits::CoordTrait;

use crate::r#type::IndexableNum;

/// A point in `D`-dimensional Euclidean space.
///
/// The dimension is part of the type, so points of different dimensions can never be mixed in
/// the same tree. Coordinates default to `f64`.
///
/// ```
/// use kd_index::Point;
///
/// let a = Point::new([0., 0.]);
/// let b = Point::new([3., 4.]);
/// assert_eq!(a.distance(&b), 5.);
/// assert_eq!(b[1], 4.);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize, N: IndexableNum = f64> {
    coords: [N; D],
}

impl<const D: usize, N: IndexableNum> Point<D, N> {
    /// Create a new point from its coordinates.
    pub fn new(coords: [N; D]) -> Self {
        Self { coords }
    }

    /// The point with every coordinate set to zero.
    pub fn origin() -> Self {
        Self {
            coords: [N::zero(); D],
        }
    }

    /// The number of coordinates, `D`.
    #[inline]
    pub const fn dim(&self) -> usize {
        D
    }

    /// Access the raw coordinates.
    pub fn coords(&self) -> &[N; D] {
        &self.coords
    }

    /// Consume the point, returning its coordinates.
    pub fn into_inner(self) -> [N; D] {
        self.coords
    }

    /// Iterate over the coordinates in axis order.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.coords.iter()
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn sq_distance(&self, other: &Self) -> N {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .fold(N::zero(), |acc, (&a, &b)| {
                let d = a - b;
                acc + d * d
            })
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Self) -> N {
        self.sq_distance(other).sqrt()
    }
}

impl<N: IndexableNum> Point<2, N> {
    /// Create a 2D point from any [`CoordTrait`] implementation, such as a `geo` coordinate.
    pub fn from_coord(coord: &impl CoordTrait<T = N>) -> Self {
        Self::new([coord.x(), coord.y()])
    }
}

impl<const D: usize, N: IndexableNum> Index<usize> for Point<D, N> {
    type Output = N;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.coords[index]
    }
}

impl<const D: usize, N: IndexableNum> IndexMut<usize> for Point<D, N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.coords[index]
    }
}

impl<const D: usize, N: IndexableNum> From<[N; D]> for Point<D, N> {
    fn from(coords: [N; D]) -> Self {
        Self::new(coords)
    }
}

impl<const D: usize, N: IndexableNum> From<Point<D, N>> for [N; D] {
    fn from(point: Point<D, N>) -> Self {
        point.coords
    }
}

impl<N: IndexableNum> CoordTrait for Point<2, N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.coords[0]
    }

    fn y(&self) -> Self::T {
        self.coords[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 | 1 => self.coords[n],
            _ => panic!("Invalid index of coord"),
        }
    }
}

impl<N: IndexableNum> CoordTrait for Point<3, N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xyz
    }

    fn x(&self) -> Self::T {
        self.coords[0]
    }

    fn y(&self) -> Self::T {
        self.coords[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0..=2 => self.coords[n],
            _ => panic!("Invalid index of coord"),
        }
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new([1., 2., 3.]);
        let b = Point::new([4., 6., 3.]);
        assert_relative_eq!(a.distance(&b), 5.);
        assert_relative_eq!(a.sq_distance(&b), 25.);
        assert_relative_eq!(b.distance(&a), a.distance(&b));
        assert_relative_eq!(a.distance(&a), 0.);
    }

    #[test]
    fn single_precision() {
        let a = Point::<2, f32>::new([0., 0.]);
        let b = Point::<2, f32>::new([1., 1.]);
        assert_relative_eq!(a.distance(&b), std::f32::consts::SQRT_2);
    }

    #[test]
    fn indexed_access() {
        let mut p = Point::<4>::origin();
        assert_eq!(p.dim(), 4);
        p[2] = 7.5;
        assert_eq!(p[2], 7.5);
        assert_eq!(p.into_inner(), [0., 0., 7.5, 0.]);
    }

    #[test]
    fn equality_is_component_wise() {
        let a = Point::new([0., 1., 0.]);
        let mut b = a;
        assert_eq!(a, b);
        b[2] = 1e-12;
        assert_ne!(a, b);
        // Copies are independent
        assert_eq!(a[2], 0.);
    }

    #[test]
    fn coord_trait_interop() {
        let p = Point::new([1.5, -2.]);
        assert_eq!(p.x(), 1.5);
        assert_eq!(p.y(), -2.);
        assert_eq!(p.nth(1), Some(-2.));
        assert_eq!(Point::from_coord(&p), p);

        let q = Point::new([1., 2., 3.]);
        assert_eq!(q.nth_or_panic(2), 3.);
        assert_eq!(q.dim(), 3);
    }
}
