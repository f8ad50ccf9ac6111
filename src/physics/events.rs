//! Physics Events
//!
//! Events recorded during a tick for gameplay code and debugging.
//! The core reports contacts; it never resolves them.

use serde::{Serialize, Deserialize};

use crate::physics::collision::Side;
use crate::physics::entity::EntityId;
use crate::physics::tilemap::TileKind;

/// Physics event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PhysicsEventData {
    /// Entity added to the world
    EntitySpawned {
        /// New entity
        entity: EntityId,
    },

    /// Entity removed at the end of a tick
    EntityDespawned {
        /// Removed entity
        entity: EntityId,
    },

    /// Entity overlaps a solid tile
    TileContact {
        /// Entity queried
        entity: EntityId,
        /// Tile side hit, if any rule matched
        side: Option<Side>,
        /// Tile kind
        tile_value: TileKind,
    },

    /// Two entities overlap
    EntityOverlap {
        /// Reference entity (lower id)
        a: EntityId,
        /// Other entity
        b: EntityId,
        /// Side of `a` that `b` lies against
        side: Side,
    },
}

/// A physics event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: PhysicsEventData,
}

impl PhysicsEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: PhysicsEventData) -> Self {
        Self { tick, data }
    }

    /// Entity added.
    pub fn entity_spawned(tick: u64, entity: EntityId) -> Self {
        Self::new(tick, PhysicsEventData::EntitySpawned { entity })
    }

    /// Entity removed.
    pub fn entity_despawned(tick: u64, entity: EntityId) -> Self {
        Self::new(tick, PhysicsEventData::EntityDespawned { entity })
    }

    /// Entity touching a tile.
    pub fn tile_contact(tick: u64, entity: EntityId, side: Option<Side>, tile_value: TileKind) -> Self {
        Self::new(tick, PhysicsEventData::TileContact { entity, side, tile_value })
    }

    /// Two entities overlapping.
    pub fn entity_overlap(tick: u64, a: EntityId, b: EntityId, side: Side) -> Self {
        Self::new(tick, PhysicsEventData::EntityOverlap { a, b, side })
    }

    /// Entity the event is about (the reference entity for overlaps).
    pub fn entity(&self) -> EntityId {
        match &self.data {
            PhysicsEventData::EntitySpawned { entity }
            | PhysicsEventData::EntityDespawned { entity }
            | PhysicsEventData::TileContact { entity, .. } => *entity,
            PhysicsEventData::EntityOverlap { a, .. } => *a,
        }
    }
}
