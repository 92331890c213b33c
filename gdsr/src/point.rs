//!
//! # Point Module
//!
//! Two-dimensional [Point]s in floating-point layout-space, in user-units.
//!

// Std-Lib
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::error::{LayoutError, LayoutResult};

/// Absolute tolerance for approximate [Point] comparisons
pub const EPSILON: f64 = 1e-9;

/// # Point in two-dimensional layout-space
///
/// A plain value: all operations create new [Point]s.
/// Hashing and [Eq] operate on bit-patterns, with `-0.0` treated as `0.0`.
///
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
    /// The origin, (0,0)
    pub fn origin() -> Self {
        Self::default()
    }
    /// Destructure into an `(x, y)` tuple
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }
    /// Cross product (z-component) of `self` and `other`, as vectors from the origin
    pub fn cross(&self, other: &Point) -> f64 {
        self.x * other.y - self.y * other.x
    }
    /// Dot product of `self` and `other`
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: &Point) -> f64 {
        (*other - *self).norm()
    }
    /// Length as a vector from the origin
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
    /// Rotate by `angle` degrees counter-clockwise about `centre`
    pub fn rotate(&self, angle: f64, centre: impl Into<Point>) -> Point {
        let centre = centre.into();
        let (sin, cos) = angle.to_radians().sin_cos();
        let d = *self - centre;
        centre + Point::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
    }
    /// Scale by `factor` about `centre`
    pub fn scale(&self, factor: f64, centre: impl Into<Point>) -> Point {
        let centre = centre.into();
        centre + (*self - centre) * factor
    }
    /// Reflect about the x-axis
    pub fn reflect_x(&self) -> Point {
        Point::new(self.x, -self.y)
    }
    /// Round each coordinate to `digits` decimal places
    pub fn round(&self, digits: u32) -> Point {
        let pow = 10f64.powi(digits as i32);
        Point::new((self.x * pow).round() / pow, (self.y * pow).round() / pow)
    }
    /// Boolean indication of whether `other` lies within [EPSILON] of `self` in both coordinates
    pub fn is_close(&self, other: &Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }
    /// Divide by scalar `val`. Fails if `val` is zero.
    pub fn checked_div(&self, val: f64) -> LayoutResult<Point> {
        if val == 0.0 {
            return Err(LayoutError::Arithmetic(format!("Division of {} by zero", self)));
        }
        Ok(Point::new(self.x / val, self.y / val))
    }
    /// Divide coordinate-wise by `other`. Fails if either coordinate of `other` is zero.
    pub fn checked_div_point(&self, other: &Point) -> LayoutResult<Point> {
        if other.x == 0.0 || other.y == 0.0 {
            return Err(LayoutError::Arithmetic(format!(
                "Division of {} by {}",
                self, other
            )));
        }
        Ok(Point::new(self.x / other.x, self.y / other.y))
    }
    /// Floor-divide by scalar `val`. Fails if `val` is zero.
    pub fn checked_floor_div(&self, val: f64) -> LayoutResult<Point> {
        let p = self.checked_div(val)?;
        Ok(Point::new(p.x.floor(), p.y.floor()))
    }
    /// Floor-divide coordinate-wise by `other`. Fails if either coordinate of `other` is zero.
    pub fn checked_floor_div_point(&self, other: &Point) -> LayoutResult<Point> {
        let p = self.checked_div_point(other)?;
        Ok(Point::new(p.x.floor(), p.y.floor()))
    }
    /// Bit-patterns used for hashing and equality, with negative zero normalized
    fn bits(&self) -> (u64, u64) {
        // Adding positive zero maps -0.0 to 0.0, and leaves all else unchanged
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}
impl Eq for Point {}
impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state)
    }
}
impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}
impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Self::new(p.0, p.1)
    }
}
impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}
impl From<(i32, i32)> for Point {
    fn from(p: (i32, i32)) -> Self {
        Self::new(p.0 as f64, p.1 as f64)
    }
}
impl From<[i32; 2]> for Point {
    fn from(p: [i32; 2]) -> Self {
        Self::new(p[0] as f64, p[1] as f64)
    }
}
impl From<&Point> for Point {
    fn from(p: &Point) -> Self {
        *p
    }
}
impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl Add<f64> for Point {
    type Output = Point;
    fn add(self, rhs: f64) -> Point {
        Point::new(self.x + rhs, self.y + rhs)
    }
}
impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}
impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}
impl Sub<f64> for Point {
    type Output = Point;
    fn sub(self, rhs: f64) -> Point {
        Point::new(self.x - rhs, self.y - rhs)
    }
}
impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        *self = *self - rhs;
    }
}
impl Mul for Point {
    type Output = Point;
    /// Coordinate-wise multiplication
    fn mul(self, rhs: Point) -> Point {
        Point::new(self.x * rhs.x, self.y * rhs.y)
    }
}
impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}
impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}
