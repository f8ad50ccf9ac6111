//! # Santarun Physics
//!
//! 2D physics and collision core for the Santarun platformer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SANTARUN PHYSICS                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Value types                               │
//! │  ├── vec2.rs     - 2D f64 vector                             │
//! │  └── rect.rs     - Axis-aligned rectangle                    │
//! │                                                              │
//! │  physics/        - Simulation                                │
//! │  ├── entity.rs   - Rigid entities, Euler integration         │
//! │  ├── verlet.rs   - Point masses and distance constraints     │
//! │  ├── collision.rs- AABB overlap and side classification      │
//! │  ├── tilemap.rs  - Tile grids and tile collision             │
//! │  ├── scroll.rs   - Scrolling tile map groups                 │
//! │  ├── state.rs    - Simulation world                          │
//! │  ├── events.rs   - Physics events                            │
//! │  └── tick.rs     - Fixed-step simulation loop                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//!
//! - Screen coordinates: x grows right, y grows down
//! - Positions are top-left corners, in world units (pixels)
//! - One tick is one fixed step; there is no time-step parameter
//! - Entities live in a BTreeMap so every sweep runs in id order

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod physics;

// Re-export commonly used types
pub use core::rect::Rect;
pub use core::vec2::Vector2;
pub use physics::entity::{EntityId, RigidEntity};
pub use physics::state::World;
pub use physics::tick::{tick, SimConfig, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Default tile edge length in world units
pub const TILE_SIZE: f64 = 16.0;
