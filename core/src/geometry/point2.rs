//! 2-D Points

#![allow(dead_code)]
use super::{Float, HashBuffer, HashBytes, Int};
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

/// A 2-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

/// 2-D point containing `Int` values.
pub type Point2i = Point2<Int>;

impl<T: Num> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Creates a new 2-D zero point.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero())
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl<T: Num> Add for Point2<T> {
    type Output = Self;

    /// Adds the given point and returns the result.
    ///
    /// * `other` -  The point to add.
    fn add(self, other: Self) -> Self::Output {
        Self::Output::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num> Sub for Point2<T> {
    type Output = Self;

    /// Subtracts the given point and returns the result.
    ///
    /// * `other` -  The point to subtract.
    fn sub(self, other: Self) -> Self::Output {
        Self::Output::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Num + Copy> Mul<T> for Point2<T> {
    type Output = Self;

    /// Scale the point.
    ///
    /// * `f` -  The scaling factor.
    fn mul(self, f: T) -> Self::Output {
        Self::Output::new(f * self.x, f * self.y)
    }
}

impl Mul<Point2f> for Float {
    type Output = Point2f;

    /// Scale the point.
    ///
    /// * `p` -  The point.
    fn mul(self, p: Point2f) -> Point2f {
        Point2f::new(self * p.x, self * p.y)
    }
}

impl<T: Num + Copy> Div<T> for Point2<T> {
    type Output = Self;

    /// Scale the point by 1/f.
    ///
    /// * `f` -  The scaling factor.
    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());

        let inv = T::one() / f;
        Self::Output::new(inv * self.x, inv * self.y)
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;

    /// Index the point to get the immutable coordinate value.
    ///
    /// * `i` -  Coordinate index in [0, 1].
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Invalid index {i} for 2-D point"),
        }
    }
}

impl<T> IndexMut<usize> for Point2<T> {
    /// Index the point to get a mutable coordinate value.
    ///
    /// * `i` -  Coordinate index in [0, 1].
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Invalid index {i} for 2-D point"),
        }
    }
}

impl From<Point2i> for Point2f {
    /// Convert a 2-D point with integer coordinates to floating point.
    ///
    /// * `p` -  2-D integer point.
    fn from(p: Point2i) -> Self {
        Self::new(p.x as Float, p.y as Float)
    }
}

impl HashBytes for Point2f {
    fn hash_bytes(&self, buf: &mut HashBuffer) {
        self.x.hash_bytes(buf);
        self.y.hash_bytes(buf);
    }
}

impl<T: fmt::Display> fmt::Display for Point2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
