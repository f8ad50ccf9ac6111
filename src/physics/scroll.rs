//! Scrolling Tile Map Group
//!
//! A level made of several screen-wide tile maps laid out left to right. The
//! group scrolls horizontally to keep the player centred, and stops at either
//! end of the strip.

use serde::{Serialize, Deserialize};

use crate::core::rect::Rect;
use crate::core::vec2::Vector2;
use crate::physics::entity::RigidEntity;
use crate::physics::tilemap::{CollisionResult, TileKind, TileMap};

/// Horizontal strip of tile maps sharing one scroll position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TileMapGroup {
    tilemaps: Vec<TileMap>,
    offset_x: f64,
}

impl TileMapGroup {
    /// Group the maps in left-to-right order.
    pub fn new(tilemaps: Vec<TileMap>) -> Self {
        Self {
            tilemaps,
            offset_x: 0.0,
        }
    }

    /// Append a map on the right.
    pub fn push(&mut self, tilemap: TileMap) {
        self.tilemaps.push(tilemap);
    }

    /// Member maps, left to right.
    pub fn tilemaps(&self) -> &[TileMap] {
        &self.tilemaps
    }

    /// True if the group has no maps.
    pub fn is_empty(&self) -> bool {
        self.tilemaps.is_empty()
    }

    /// Current horizontal scroll.
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    /// Scroll to `offset_x` and lay the maps out for a view `view_width` wide.
    pub fn set_offset_x(&mut self, offset_x: f64, view_width: f64) {
        self.offset_x = offset_x;
        self.layout(view_width);
    }

    /// Scroll to follow `player` in a view `view_width` wide.
    ///
    /// While the strip can scroll, the player is pinned to the view centre and
    /// the maps move by `-player.velocity.x` instead. At either end the player
    /// is left free to walk to the edge of the screen.
    pub fn follow(&mut self, player: &mut RigidEntity, view_width: f64) {
        if self.tilemaps.is_empty() {
            return;
        }

        let half = view_width / 2.0;
        let player_offset = player.position.x - half;
        let end_right = -view_width * (self.tilemaps.len() - 1) as f64;

        if player_offset > 0.0 && self.offset_x <= end_right {
            // At right end
            self.offset_x = end_right;
        } else if player_offset < 0.0 && self.offset_x >= 0.0 {
            // At left end
            self.offset_x = 0.0;
        } else {
            self.offset_x -= player.velocity.x;
            player.position.x = half;
        }

        self.layout(view_width);
    }

    /// Collisions against every map, in member order.
    pub fn query_collisions(&self, rect: &Rect, velocity: Vector2) -> Vec<CollisionResult> {
        self.tilemaps
            .iter()
            .flat_map(|map| map.query_collisions(rect, velocity))
            .collect()
    }

    /// [`TileMap::tile_at`] over every map.
    pub fn tile_at(&self, x: f64, y: f64, ignore: &[TileKind]) -> bool {
        self.tilemaps.iter().any(|map| map.tile_at(x, y, ignore))
    }

    fn layout(&mut self, view_width: f64) {
        for (index, tilemap) in self.tilemaps.iter_mut().enumerate() {
            tilemap.set_offset(self.offset_x + view_width * index as f64, 0.0);
        }
    }
}
