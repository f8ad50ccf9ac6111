//! Simulation Tick
//!
//! One fixed step of the whole physics core. Within a tick every integrator
//! finishes before anything reads the new positions:
//!
//! 1. Euler-integrate rigid entities
//! 2. Verlet-step soft bodies, then one constraint pass each
//! 3. Query tile contacts for every entity
//! 4. Sweep entity-vs-entity overlaps (optional)
//! 5. Apply despawns queued during the tick
//!
//! Contacts are reported, never resolved. Gameplay code reads the
//! [`TickResult`] and adjusts positions/velocities for the next tick.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::core::vec2::Vector2;
use crate::physics::collision::{check_all_entity_overlaps, EntityOverlap};
use crate::physics::entity::{integrate_entities, EntityId};
use crate::physics::events::PhysicsEvent;
use crate::physics::state::World;
use crate::physics::tilemap::CollisionResult;
use crate::physics::verlet::ConstraintGuard;
use crate::TILE_SIZE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },

    /// JSON config could not be decoded.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Uniform force added to every free point mass per tick
    pub verlet_force: Vector2,
    /// Zero-length constraint policy
    pub constraint_guard: ConstraintGuard,
    /// Run the entity-vs-entity sweep
    pub entity_overlaps: bool,
    /// Tile width in world units
    pub tile_width: f64,
    /// Tile height in world units
    pub tile_height: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            verlet_force: Vector2::new(0.0, 0.2),
            constraint_guard: ConstraintGuard::SkipDegenerate,
            entity_overlaps: true,
            tile_width: TILE_SIZE,
            tile_height: TILE_SIZE,
        }
    }
}

impl SimConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// - `SANTARUN_GRAVITY`: vertical Verlet force
    /// - `SANTARUN_WIND`: horizontal Verlet force
    /// - `SANTARUN_TILE_SIZE`: square tile size
    /// - `SANTARUN_ENTITY_OVERLAPS`: `true`/`false`
    /// - `SANTARUN_UNGUARDED_CONSTRAINTS`: `true`/`false`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SimConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(gravity) = parse_var(&lookup, "SANTARUN_GRAVITY", parse_f64)? {
            config.verlet_force.y = gravity;
        }
        if let Some(wind) = parse_var(&lookup, "SANTARUN_WIND", parse_f64)? {
            config.verlet_force.x = wind;
        }
        if let Some(size) = parse_var(&lookup, "SANTARUN_TILE_SIZE", parse_f64)? {
            config.tile_width = size;
            config.tile_height = size;
        }
        if let Some(enabled) = parse_var(&lookup, "SANTARUN_ENTITY_OVERLAPS", parse_bool)? {
            config.entity_overlaps = enabled;
        }
        if let Some(true) = parse_var(&lookup, "SANTARUN_UNGUARDED_CONSTRAINTS", parse_bool)? {
            config.constraint_guard = ConstraintGuard::Unguarded;
        }

        Ok(config)
    }

    /// Decode from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Tile size as `(width, height)`.
    pub fn tile_size(&self) -> (f64, f64) {
        (self.tile_width, self.tile_height)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => parse(raw.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidValue { var: var.to_string(), value: raw }),
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.parse().ok().filter(|v: &f64| v.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Tile contacts of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileContact {
    /// Entity queried
    pub entity: EntityId,
    /// Overlapping tiles, in tile load order
    pub results: Vec<CollisionResult>,
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick number just completed
    pub tick: u64,
    /// Entities touching tiles this tick
    pub tile_contacts: Vec<TileContact>,
    /// Overlapping entity pairs this tick
    pub entity_overlaps: Vec<EntityOverlap>,
    /// Events generated this tick
    pub events: Vec<PhysicsEvent>,
}

impl TickResult {
    /// Tile contacts for one entity, if any.
    pub fn contacts_for(&self, entity: EntityId) -> Option<&TileContact> {
        self.tile_contacts.iter().find(|c| c.entity == entity)
    }
}

/// Run one simulation tick.
pub fn tick(world: &mut World, config: &SimConfig) -> TickResult {
    world.tick += 1;
    let mut result = TickResult {
        tick: world.tick,
        ..TickResult::default()
    };

    // 1. Rigid entities
    integrate_entities(world.entities.values_mut());

    // 2. Soft bodies
    for body in &mut world.soft_bodies {
        body.step(config.verlet_force, config.constraint_guard);
    }

    // 3. Tile contacts
    if !world.tilemaps.is_empty() {
        for (id, entity) in &world.entities {
            let results = world.tilemaps.query_collisions(&entity.rect(), entity.velocity);
            if !results.is_empty() {
                result.tile_contacts.push(TileContact { entity: *id, results });
            }
        }
    }

    for contact in &result.tile_contacts {
        for hit in &contact.results {
            world.push_event(PhysicsEvent::tile_contact(
                world.tick,
                contact.entity,
                hit.side,
                hit.tile_value,
            ));
        }
    }

    // 4. Entity-vs-entity
    if config.entity_overlaps {
        result.entity_overlaps = check_all_entity_overlaps(&world.entities);
        for overlap in &result.entity_overlaps {
            world.push_event(PhysicsEvent::entity_overlap(
                world.tick,
                overlap.a,
                overlap.b,
                overlap.side,
            ));
        }
    }

    // 5. Deferred removals
    world.apply_despawns();

    if !result.tile_contacts.is_empty() || !result.entity_overlaps.is_empty() {
        debug!(
            tick = world.tick,
            tile_contacts = result.tile_contacts.len(),
            entity_overlaps = result.entity_overlaps.len(),
            "contacts"
        );
    }
    trace!(
        tick = world.tick,
        entities = world.entities.len(),
        soft_bodies = world.soft_bodies.len(),
        "tick complete"
    );

    result.events = world.take_events();
    result
}

/// Run `ticks` ticks, stopping early if `on_tick` returns false.
///
/// Returns the number of ticks run.
pub fn run_ticks(
    world: &mut World,
    config: &SimConfig,
    ticks: u64,
    mut on_tick: impl FnMut(&mut World, &TickResult) -> bool,
) -> u64 {
    for n in 0..ticks {
        let result = tick(world, config);
        if !on_tick(world, &result) {
            return n + 1;
        }
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::physics::collision::Side;
    use crate::physics::entity::RigidEntity;
    use crate::physics::events::PhysicsEventData;
    use crate::physics::scroll::TileMapGroup;
    use crate::physics::tilemap::{TileGrid, TileMap};
    use crate::physics::verlet::{PointMass, SoftBody};

    /// 4x4 screen of 16-unit tiles with a solid bottom row.
    fn floor_world() -> World {
        let grid = TileGrid::parse("4.4.0000000000001111").unwrap();
        let map = TileMap::new(&grid, 1, (16.0, 16.0)).unwrap();
        World::with_tilemaps(TileMapGroup::new(vec![map]))
    }

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.verlet_force, Vector2::new(0.0, 0.2));
        assert_eq!(config.constraint_guard, ConstraintGuard::SkipDegenerate);
        assert!(config.entity_overlaps);
        assert_eq!(config.tile_size(), (16.0, 16.0));
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SANTARUN_GRAVITY", "0.5"),
            ("SANTARUN_WIND", "-0.1"),
            ("SANTARUN_TILE_SIZE", "8"),
            ("SANTARUN_ENTITY_OVERLAPS", "false"),
            ("SANTARUN_UNGUARDED_CONSTRAINTS", "1"),
        ]
        .into_iter()
        .collect();

        let config = SimConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.verlet_force, Vector2::new(-0.1, 0.5));
        assert_eq!(config.tile_size(), (8.0, 8.0));
        assert!(!config.entity_overlaps);
        assert_eq!(config.constraint_guard, ConstraintGuard::Unguarded);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let err = SimConfig::from_lookup(|k| (k == "SANTARUN_GRAVITY").then(|| "heavy".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "SANTARUN_GRAVITY"));

        let err = SimConfig::from_lookup(|k| (k == "SANTARUN_ENTITY_OVERLAPS").then(|| "yes".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_config_json() {
        let config = SimConfig::from_json(r#"{"entity_overlaps": false}"#).unwrap();
        assert!(!config.entity_overlaps);
        assert_eq!(config.verlet_force, Vector2::new(0.0, 0.2));

        let json = serde_json::to_string(&SimConfig::default()).unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), SimConfig::default());

        assert!(matches!(SimConfig::from_json("[1, 2]"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_falling_entity_lands_on_top() {
        let mut world = floor_world();
        let config = SimConfig::default();

        let mut player = RigidEntity::at(Vector2::new(2.0, 30.0), 12.0, 12.0);
        player.velocity = Vector2::new(0.0, 5.0);
        let id = world.spawn(player);

        // Integration runs before the query: the box reaches y 35..47, then
        // 40..52 which sinks into the floor at y = 48
        let first = tick(&mut world, &config);
        assert!(first.contacts_for(id).is_none());

        let second = tick(&mut world, &config);
        let contact = second.contacts_for(id).unwrap();
        assert_eq!(contact.results.len(), 1);
        assert_eq!(contact.results[0].side, Some(Side::Top));
        assert!(second.events.iter().any(|e| matches!(
            e.data,
            PhysicsEventData::TileContact { entity, side: Some(Side::Top), .. } if entity == id
        )));
    }

    #[test]
    fn test_entity_overlaps_reported() {
        let mut world = World::new();
        let config = SimConfig::default();
        let a = world.spawn(RigidEntity::at(Vector2::new(0.0, 0.0), 10.0, 10.0));
        let b = world.spawn(RigidEntity::at(Vector2::new(0.0, 30.0), 10.0, 10.0));
        world.entity_mut(b).unwrap().velocity = Vector2::new(0.0, -25.0);

        let result = tick(&mut world, &config);

        assert_eq!(result.entity_overlaps.len(), 1);
        assert_eq!(result.entity_overlaps[0].a, a);
        assert_eq!(result.entity_overlaps[0].side, Side::Top);

        let quiet = SimConfig { entity_overlaps: false, ..SimConfig::default() };
        assert!(tick(&mut world, &quiet).entity_overlaps.is_empty());
    }

    #[test]
    fn test_soft_bodies_step_each_tick() {
        let mut world = World::new();
        let mut body = SoftBody::new();
        let anchor = body.add_point(PointMass::pinned(0.0, 0.0));
        let bob = body.add_point(PointMass::new(0.0, 10.0));
        body.add_constraint(anchor, bob).unwrap();
        let id = world.add_soft_body(body);

        let config = SimConfig { verlet_force: Vector2::new(0.0, 1.0), ..SimConfig::default() };
        tick(&mut world, &config);

        let body = world.soft_body(id).unwrap();
        assert_eq!(body.points()[0].position(), Vector2::ZERO);
        // Fell to 11, then pulled halfway back toward the rest length
        assert!((body.points()[1].y - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_despawn_applied_after_pass() {
        let mut world = floor_world();
        let config = SimConfig::default();
        let id = world.spawn(RigidEntity::at(Vector2::new(2.0, 40.0), 8.0, 8.0));
        world.despawn(id);

        let result = tick(&mut world, &config);

        // Still queried this tick, gone afterwards
        assert!(result.contacts_for(id).is_some());
        assert!(world.entity(id).is_none());
        assert!(result
            .events
            .iter()
            .any(|e| e.data == PhysicsEventData::EntityDespawned { entity: id }));
    }

    #[test]
    fn test_run_ticks_stops_early() {
        let mut world = World::new();
        let config = SimConfig::default();
        let ran = run_ticks(&mut world, &config, 100, |w, _| w.tick < 5);
        assert_eq!(ran, 5);
        assert_eq!(world.tick, 5);
    }
}
