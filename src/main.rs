//! Santarun Physics Sandbox
//!
//! Runs the physics core headless: a player falling onto a level and walking
//! right while the level scrolls, next to a hanging rope.
//!
//! Usage: `santarun-sim [TILE_MAP_FILE]`. The file holds a grid in the
//! `rows.cols.cells` format; without one a built-in level is used.

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use santarun::{
    TICK_RATE, TILE_SIZE, VERSION,
    core::vec2::Vector2,
    physics::{
        collision::Side,
        entity::RigidEntity,
        events::PhysicsEventData,
        scroll::TileMapGroup,
        state::World,
        tick::{run_ticks, SimConfig},
        tilemap::{TileGrid, TileMap, TileMapError},
        verlet::SoftBody,
    },
};

/// Level screens laid side by side.
const SCREENS: usize = 3;

/// Tile kinds the built-in level uses.
const TILE_KINDS: usize = 2;

/// Demo length: 10 seconds.
const DEMO_TICKS: u64 = 10 * TICK_RATE as u64;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Santarun Physics v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = SimConfig::from_env().context("invalid simulation config")?;
    debug!(?config, "loaded config");

    let grid = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read tile map {path}"))?;
            TileGrid::parse(&text).with_context(|| format!("failed to parse tile map {path}"))?
        }
        None => builtin_level().context("failed to build built-in level")?,
    };

    demo(&grid, &config)
}

/// 8x16 screen: solid floor, a ledge, and a few `z` cells the tile list
/// does not cover.
fn builtin_level() -> Result<TileGrid, TileMapError> {
    let rows = [
        "0000000000000000",
        "0000000000000000",
        "00000000000zz000",
        "0000000000000000",
        "0000002222000000",
        "0000000000000000",
        "0000000000000000",
        "1111111111111111",
    ];
    let cols = rows[0].len();
    TileGrid::parse(&format!("{}.{}.{}", rows.len(), cols, rows.concat()))
}

fn demo(grid: &TileGrid, config: &SimConfig) -> Result<()> {
    info!("=== Starting Demo ===");

    let map = TileMap::new(grid, TILE_KINDS, config.tile_size()).context("failed to build tile map")?;
    let view_width = map.pixel_width();
    info!(
        "Level: {} screens of {}x{} tiles ({} solid each)",
        SCREENS,
        map.cols(),
        map.rows(),
        map.valid_tiles().len()
    );

    let mut world = World::with_tilemaps(TileMapGroup::new(vec![map; SCREENS]));

    let mut player = RigidEntity::at(Vector2::new(32.0, 0.0), 12.0, 14.0);
    player.acceleration = Vector2::new(0.0, 0.5);
    let player_id = world.spawn(player);

    let rope = SoftBody::rope(
        Vector2::new(view_width / 2.0, 0.0),
        Vector2::new(view_width / 2.0 + 4.0 * TILE_SIZE, 0.0),
        8,
        true,
    )
    .context("failed to build rope")?;
    let rope_id = world.add_soft_body(rope);

    let mut landed_at = None;
    let mut events = Vec::new();

    let ticks = run_ticks(&mut world, config, DEMO_TICKS, |world, result| {
        events.extend(result.events.iter().cloned());

        let Some(contact) = result.contacts_for(player_id) else {
            return true;
        };

        // Gameplay-side resolution: stand on whatever tile top was hit
        let floor = contact
            .results
            .iter()
            .filter(|hit| hit.side == Some(Side::Top))
            .map(|hit| hit.y)
            .reduce(f64::min);

        if let (Some(floor_y), Some(player)) = (floor, world.entity_mut(player_id)) {
            player.position.y = floor_y - player.height;
            player.velocity.y = 0.0;
            if landed_at.is_none() {
                landed_at = Some(result.tick);
                info!("Player landed at tick {} on y = {}", result.tick, floor_y);
                player.velocity.x = 2.0;
            }
        }

        if let Some(player) = world.entities.get_mut(&player_id) {
            world.tilemaps.follow(player, view_width);
        }
        true
    });

    info!("=== Results ===");
    info!("Ran {} ticks", ticks);
    if let Some(player) = world.entity(player_id) {
        info!("Player at {}", player.position);
    }
    info!("Scroll offset: {}", world.tilemaps.offset_x());
    if let Some(rope) = world.soft_body(rope_id) {
        if let Some(tail) = rope.points().last() {
            info!("Rope end at {}", tail.position());
        }
    }

    let tile_contacts = events
        .iter()
        .filter(|e| matches!(e.data, PhysicsEventData::TileContact { .. }))
        .count();
    info!("Total events: {} ({} tile contacts)", events.len(), tile_contacts);

    let json = serde_json::to_string_pretty(&events[..events.len().min(5)])
        .context("failed to encode events")?;
    println!("{json}");

    Ok(())
}
