//! Axis-Aligned Rectangle
//!
//! Bounding boxes for entities and tiles, stored as top-left corner plus size.
//! Screen coordinates: +Y points down.

use serde::{Serialize, Deserialize};

use super::vec2::Vector2;

/// Axis-aligned rectangle `(x, y, w, h)`.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle at `position` with the given `size`.
    #[inline]
    pub fn from_position_size(position: Vector2, size: Vector2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Left edge (`x`).
    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge (`x + w`).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Top edge (`y`).
    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge (`y + h`).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.center_x(), self.center_y())
    }

    /// Copy moved by `(dx, dy)`.
    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

impl From<(f64, f64, f64, f64)> for Rect {
    #[inline]
    fn from((x, y, w, h): (f64, f64, f64, f64)) -> Self {
        Self { x, y, w, h }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_center() {
        let r = Rect::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 14.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 26.0);
        assert_eq!(r.center(), Vector2::new(12.0, 23.0));
    }

    #[test]
    fn test_rect_translated() {
        let r = Rect::from((0.0, 0.0, 8.0, 8.0)).translated(-3.0, 5.0);
        assert_eq!(r, Rect::new(-3.0, 5.0, 8.0, 8.0));
    }
}
