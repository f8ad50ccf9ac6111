//! Simulation World
//!
//! Owns everything one simulation advances: rigid entities, soft bodies and
//! the level's tile maps. Uses BTreeMap for deterministic iteration order.
//!
//! Removal is deferred: [`World::despawn`] only queues the id, and the queue is
//! applied once the current pass over the entities is over.

use std::collections::BTreeMap;

use crate::physics::entity::{EntityId, RigidEntity};
use crate::physics::events::PhysicsEvent;
use crate::physics::scroll::TileMapGroup;
use crate::physics::verlet::SoftBody;

/// Index of a soft body inside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SoftBodyId(pub usize);

/// Simulation context.
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Entities by id
    pub entities: BTreeMap<EntityId, RigidEntity>,

    /// Ropes and other point/constraint aggregates
    pub soft_bodies: Vec<SoftBody>,

    /// Solid level geometry
    pub tilemaps: TileMapGroup,

    /// Ticks completed
    pub tick: u64,

    next_entity_id: u32,
    pending_despawn: Vec<EntityId>,
    events: Vec<PhysicsEvent>,
}

impl World {
    /// Empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty world over the given level.
    pub fn with_tilemaps(tilemaps: TileMapGroup) -> Self {
        Self {
            tilemaps,
            ..Self::default()
        }
    }

    /// Add an entity, returning its id.
    pub fn spawn(&mut self, entity: RigidEntity) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.insert(id, entity);
        self.push_event(PhysicsEvent::entity_spawned(self.tick, id));
        id
    }

    /// Queue an entity for removal after the current pass.
    ///
    /// Returns false if the entity does not exist or is already queued.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) || self.pending_despawn.contains(&id) {
            return false;
        }
        self.pending_despawn.push(id);
        true
    }

    /// Remove every queued entity.
    pub fn apply_despawns(&mut self) {
        for id in std::mem::take(&mut self.pending_despawn) {
            if self.entities.remove(&id).is_some() {
                self.push_event(PhysicsEvent::entity_despawned(self.tick, id));
            }
        }
    }

    /// True if the entity is queued for removal.
    pub fn is_despawn_pending(&self, id: EntityId) -> bool {
        self.pending_despawn.contains(&id)
    }

    /// Entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&RigidEntity> {
        self.entities.get(&id)
    }

    /// Mutable entity by id.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut RigidEntity> {
        self.entities.get_mut(&id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Add a soft body, returning its index.
    pub fn add_soft_body(&mut self, body: SoftBody) -> SoftBodyId {
        self.soft_bodies.push(body);
        SoftBodyId(self.soft_bodies.len() - 1)
    }

    /// Soft body by id.
    pub fn soft_body(&self, id: SoftBodyId) -> Option<&SoftBody> {
        self.soft_bodies.get(id.0)
    }

    /// Mutable soft body by id.
    pub fn soft_body_mut(&mut self, id: SoftBodyId) -> Option<&mut SoftBody> {
        self.soft_bodies.get_mut(id.0)
    }

    /// Record an event.
    pub fn push_event(&mut self, event: PhysicsEvent) {
        self.events.push(event);
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }
}
