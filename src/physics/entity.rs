//! Rigid Entities
//!
//! Axis-aligned game objects advanced by explicit Euler integration.
//! Rotation is not modelled.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::rect::Rect;
use crate::core::vec2::Vector2;

/// Entity identifier, allocated by [`World`](crate::physics::state::World).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rigid, axis-aligned entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidEntity {
    /// Top-left corner in world units
    pub position: Vector2,

    /// General-purpose speed vector (gameplay-owned)
    pub speed: Vector2,

    /// Euler velocity, added to position every step
    pub velocity: Vector2,

    /// Euler acceleration, added to velocity every step
    pub acceleration: Vector2,

    /// Bounding box width
    pub width: f64,

    /// Bounding box height
    pub height: f64,

    /// Render/update ordering layer
    pub layer: i32,

    /// Reserved for future rigid-body work
    pub mass: f64,

    /// Reserved for future rigid-body work
    pub density: f64,
}

impl RigidEntity {
    /// Create an entity of the given size at the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            position: Vector2::ZERO,
            speed: Vector2::ZERO,
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            width,
            height,
            layer: 1,
            mass: 0.0,
            density: 0.0,
        }
    }

    /// Create an entity of the given size at `position`.
    pub fn at(position: Vector2, width: f64, height: f64) -> Self {
        Self {
            position,
            ..Self::new(width, height)
        }
    }

    /// Size as a vector.
    #[inline]
    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    /// Current bounding box.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    /// One explicit Euler step: `velocity += acceleration; position += velocity`.
    ///
    /// Nothing is decayed; zeroing or damping between ticks is the caller's job.
    #[inline]
    pub fn euler_step(&mut self) {
        self.velocity.add(self.acceleration);
        self.position.add(self.velocity);
    }
}

/// Euler-step every entity in the collection.
pub fn integrate_entities<'a>(entities: impl IntoIterator<Item = &'a mut RigidEntity>) {
    for entity in entities {
        entity.euler_step();
    }
}
