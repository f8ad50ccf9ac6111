//! 2D Vector
//!
//! Plain `f64` vector used for positions, velocities and forces.
//!
//! Two flavours of arithmetic are provided:
//! - in-place mutators (`add`, `sub`, `mult`, `div`, `normalize`, `zero`)
//!   for per-tick accumulation on owned state,
//! - pure operators (`+`, `-`, `*`, `/`) and helpers that return a new value.

use std::fmt;
use std::ops;
use serde::{Serialize, Deserialize};

/// 2D vector with `f64` components.
///
/// Equality is exact and componentwise.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

#[allow(clippy::should_implement_trait)]
impl Vector2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    // -------------------------------------------------------------------------
    // In-place mutators
    // -------------------------------------------------------------------------

    /// Add another vector in place.
    #[inline]
    pub fn add(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }

    /// Subtract another vector in place.
    #[inline]
    pub fn sub(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }

    /// Multiply componentwise in place.
    #[inline]
    pub fn mult(&mut self, other: Self) {
        self.x *= other.x;
        self.y *= other.y;
    }

    /// Divide componentwise in place.
    ///
    /// A zero component in `other` yields inf/NaN; nothing checks for it.
    #[inline]
    pub fn div(&mut self, other: Self) {
        self.x /= other.x;
        self.y /= other.y;
    }

    /// Scale to unit length in place.
    /// Left unchanged if the magnitude is exactly zero.
    #[inline]
    pub fn normalize(&mut self) {
        let len = self.magnitude();
        if len != 0.0 {
            self.x /= len;
            self.y /= len;
        }
    }

    /// Reset both components to zero.
    #[inline]
    pub fn zero(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }

    /// Overwrite both components.
    #[inline]
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    // -------------------------------------------------------------------------
    // Pure helpers
    // -------------------------------------------------------------------------

    /// Unit-length copy. Returns the vector unchanged if its magnitude is zero.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut v = self;
        v.normalize();
        v
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length.
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn distance(a: Self, b: Self) -> f64 {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Components as a tuple.
    #[inline]
    pub fn to_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Vector2> for (f64, f64) {
    #[inline]
    fn from(v: Vector2) -> Self {
        (v.x, v.y)
    }
}

// Operator overloads for ergonomics. The traits are referenced through
// `ops::` so the in-place inherent methods above keep their names.
impl ops::Add for Vector2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Sub for Vector2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Mul for Vector2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl ops::Mul<f64> for Vector2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl ops::Div for Vector2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl ops::Div<f64> for Vector2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl ops::Neg for Vector2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl ops::AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        Vector2::add(self, rhs);
    }
}

impl ops::SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        Vector2::sub(self, rhs);
    }
}

impl ops::MulAssign for Vector2 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        self.mult(rhs);
    }
}

impl ops::DivAssign for Vector2 {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        Vector2::div(self, rhs);
    }
}

impl fmt::Debug for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, y: {}", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
