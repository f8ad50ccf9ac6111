//! Physics Module
//!
//! Integration, constraints and collision queries. Contacts are reported,
//! never resolved.
//!
//! ## Module Structure
//!
//! - `entity`: Rigid entities and Euler integration
//! - `verlet`: Point masses, distance constraints, soft bodies
//! - `collision`: AABB overlap and side classification
//! - `tilemap`: Tile grids, tile maps, tile narrow phase
//! - `scroll`: Horizontally scrolling groups of tile maps
//! - `state`: The simulation world
//! - `events`: Events recorded during a tick
//! - `tick`: Fixed-step simulation loop and its configuration

pub mod entity;
pub mod verlet;
pub mod collision;
pub mod tilemap;
pub mod scroll;
pub mod state;
pub mod events;
pub mod tick;

// Re-export key types
pub use entity::{EntityId, RigidEntity};
pub use verlet::{ConstraintGuard, DistanceConstraint, PointId, PointMass, SoftBody};
pub use collision::{EntityOverlap, Side};
pub use tilemap::{CollisionResult, TileGrid, TileMap, TileMapError};
pub use scroll::TileMapGroup;
pub use state::{SoftBodyId, World};
pub use events::{PhysicsEvent, PhysicsEventData};
pub use tick::{SimConfig, TickResult};
