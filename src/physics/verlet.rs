//! Verlet Point Masses and Distance Constraints
//!
//! Soft structures (ropes, chains) are point masses whose velocity is implied by
//! the difference between current and previous position. Distance constraints
//! pull connected pairs toward a rest length with one relaxation pass per tick.
//!
//! Points live in an arena owned by a [`SoftBody`]; constraints reference them
//! by [`PointId`] index.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::vec2::Vector2;

// =============================================================================
// POINTS
// =============================================================================

/// Index of a point inside its owning [`SoftBody`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId(pub usize);

/// A Verlet point mass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    /// Current x
    pub x: f64,
    /// Current y
    pub y: f64,
    /// Previous x
    pub ox: f64,
    /// Previous y
    pub oy: f64,
    /// Pinned points never move
    pub pinned: bool,
}

impl PointMass {
    /// Free point at rest.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, ox: x, oy: y, pinned: false }
    }

    /// Pinned point.
    pub const fn pinned(x: f64, y: f64) -> Self {
        Self { x, y, ox: x, oy: y, pinned: true }
    }

    /// Free point with an initial per-tick velocity.
    pub fn with_velocity(x: f64, y: f64, velocity: Vector2) -> Self {
        Self {
            x,
            y,
            ox: x - velocity.x,
            oy: y - velocity.y,
            pinned: false,
        }
    }

    #[inline]
    /// Current position.
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    #[inline]
    /// Position before the last step.
    pub fn previous(&self) -> Vector2 {
        Vector2::new(self.ox, self.oy)
    }

    /// Implied velocity `(x - ox, y - oy)`.
    #[inline]
    pub fn velocity(&self) -> Vector2 {
        Vector2::new(self.x - self.ox, self.y - self.oy)
    }
}

/// Advance every non-pinned point by its implied velocity plus `force`.
///
/// Pinned points are skipped before anything is read, so their previous
/// position is never rewritten.
pub fn update_points(points: &mut [PointMass], force: Vector2) {
    for p in points.iter_mut() {
        if p.pinned {
            continue;
        }
        let vel_x = p.x - p.ox;
        let vel_y = p.y - p.oy;
        p.ox = p.x;
        p.oy = p.y;
        p.x += vel_x + force.x;
        p.y += vel_y + force.y;
    }
}

// =============================================================================
// CONSTRAINTS
// =============================================================================

/// Keeps two points near `rest_length` apart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceConstraint {
    /// First endpoint
    pub p1: PointId,
    /// Second endpoint
    pub p2: PointId,
    /// Target distance
    pub rest_length: f64,
}

/// Policy for a constraint whose endpoints coincide (distance exactly zero).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintGuard {
    /// Skip the constraint for this pass.
    #[default]
    SkipDegenerate,
    /// Divide anyway; inf/NaN reaches the point positions.
    Unguarded,
}

/// One relaxation pass over `constraints`.
///
/// Each endpoint receives half of the correction. Pinned endpoints are left in
/// place. Constraints with an index outside `points` are skipped.
pub fn update_constraints(
    points: &mut [PointMass],
    constraints: &[DistanceConstraint],
    guard: ConstraintGuard,
) {
    for c in constraints {
        let (Some(a), Some(b)) = (points.get(c.p1.0).copied(), points.get(c.p2.0).copied()) else {
            continue;
        };

        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist == 0.0 && guard == ConstraintGuard::SkipDegenerate {
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(p1 = c.p1.0, p2 = c.p2.0, "skipping zero-length constraint");
            continue;
        }

        let diff = c.rest_length - dist;
        let perc = diff / dist / 2.0;
        let offset_x = dx * perc;
        let offset_y = dy * perc;

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(p1 = c.p1.0, p2 = c.p2.0, dist, diff, "relaxing constraint");

        if !a.pinned {
            let p1 = &mut points[c.p1.0];
            p1.x += offset_x;
            p1.y += offset_y;
        }
        if !b.pinned {
            let p2 = &mut points[c.p2.0];
            p2.x -= offset_x;
            p2.y -= offset_y;
        }
    }
}

// =============================================================================
// SOFT BODY
// =============================================================================

/// Soft body construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SoftBodyError {
    /// A constraint referenced a point that does not exist.
    #[error("point {index} out of range (soft body has {len} points)")]
    PointOutOfRange {
        /// Offending index
        index: usize,
        /// Number of points in the body
        len: usize,
    },

    /// A rope needs at least one segment.
    #[error("rope needs at least one segment")]
    NoSegments,
}

/// Owning aggregate of point masses and the constraints between them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftBody {
    points: Vec<PointMass>,
    constraints: Vec<DistanceConstraint>,
}

impl SoftBody {
    /// Empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// A straight rope from `start` to `end` split into `segments` links.
    ///
    /// Rest lengths equal the initial link length. The first point is pinned
    /// when `pin_start` is set.
    pub fn rope(
        start: Vector2,
        end: Vector2,
        segments: usize,
        pin_start: bool,
    ) -> Result<Self, SoftBodyError> {
        if segments == 0 {
            return Err(SoftBodyError::NoSegments);
        }

        let mut body = Self::new();
        let step = (end - start) / segments as f64;
        let mut prev = None;

        for i in 0..=segments {
            let at = start + step * i as f64;
            let point = if i == 0 && pin_start {
                PointMass::pinned(at.x, at.y)
            } else {
                PointMass::new(at.x, at.y)
            };
            let id = body.add_point(point);
            if let Some(prev) = prev {
                body.add_constraint(prev, id)?;
            }
            prev = Some(id);
        }

        Ok(body)
    }

    /// Add a point, returning its index.
    pub fn add_point(&mut self, point: PointMass) -> PointId {
        self.points.push(point);
        PointId(self.points.len() - 1)
    }

    /// Constrain two points to their current distance.
    pub fn add_constraint(&mut self, p1: PointId, p2: PointId) -> Result<(), SoftBodyError> {
        let a = self.checked(p1)?.position();
        let b = self.checked(p2)?.position();
        self.constraints.push(DistanceConstraint {
            p1,
            p2,
            rest_length: Vector2::distance(a, b),
        });
        Ok(())
    }

    /// Constrain two points to an explicit rest length.
    pub fn add_constraint_with_length(
        &mut self,
        p1: PointId,
        p2: PointId,
        rest_length: f64,
    ) -> Result<(), SoftBodyError> {
        self.checked(p1)?;
        self.checked(p2)?;
        self.constraints.push(DistanceConstraint { p1, p2, rest_length });
        Ok(())
    }

    /// Pin a point in place.
    pub fn pin(&mut self, id: PointId) -> Result<(), SoftBodyError> {
        self.checked_mut(id)?.pinned = true;
        Ok(())
    }

    /// Release a pinned point. Its previous position is reset so it starts at rest.
    pub fn unpin(&mut self, id: PointId) -> Result<(), SoftBodyError> {
        let p = self.checked_mut(id)?;
        p.pinned = false;
        p.ox = p.x;
        p.oy = p.y;
        Ok(())
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[PointMass] {
        &self.points
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[DistanceConstraint] {
        &self.constraints
    }

    /// Point by id.
    pub fn point(&self, id: PointId) -> Option<&PointMass> {
        self.points.get(id.0)
    }

    /// Mutable point by id.
    pub fn point_mut(&mut self, id: PointId) -> Option<&mut PointMass> {
        self.points.get_mut(id.0)
    }

    /// Verlet-integrate every point, then run one constraint pass.
    pub fn step(&mut self, force: Vector2, guard: ConstraintGuard) {
        update_points(&mut self.points, force);
        update_constraints(&mut self.points, &self.constraints, guard);
    }

    fn checked(&self, id: PointId) -> Result<&PointMass, SoftBodyError> {
        let len = self.points.len();
        self.points
            .get(id.0)
            .ok_or(SoftBodyError::PointOutOfRange { index: id.0, len })
    }

    fn checked_mut(&mut self, id: PointId) -> Result<&mut PointMass, SoftBodyError> {
        let len = self.points.len();
        self.points
            .get_mut(id.0)
            .ok_or(SoftBodyError::PointOutOfRange { index: id.0, len })
    }
}
