//! Tile Maps and Tile Collision
//!
//! A tile map keeps the collidable ("valid") tiles of a level as a flat list,
//! built once from a [`TileGrid`]. A scroll offset is applied at query time so
//! the list never has to be rebuilt.
//!
//! ## Grid text format
//!
//! ```text
//! <rows>.<cols>.<cells>
//! ```
//!
//! `cells` is `rows * cols` characters in row-major order, each taken from
//! [`TILE_ALPHABET`]. `0` is an empty cell; any other character is the index
//! of a tile kind in the caller's tile list (1-based). Indices past the end of
//! that list are treated as non-collidable, which is how the editor's blank
//! tile (`z`) drops out.
//!
//! ## Narrow phase
//!
//! Tiles overlapping the query box are tagged with the side of the *tile* the
//! entity hits, decided by edge proximity and velocity sign, in this order:
//! top, right, left, bottom. Tiles that match no rule are still reported with
//! no side.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::rect::Rect;
use crate::core::vec2::Vector2;
use crate::physics::collision::{overlaps, Side};

/// Cell alphabet, in index order.
pub const TILE_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Cell index meaning "no tile".
pub const EMPTY_CELL: TileKind = 0;

/// Max distance (world units) between touching edges for a side to be assigned.
pub const DEFAULT_COLLISION_THRESHOLD: f64 = 6.0;

/// Tile type tag: the cell's index in [`TILE_ALPHABET`].
pub type TileKind = u8;

/// Tile map errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TileMapError {
    /// Tile list is longer than the cell alphabet can address.
    #[error("too many tile kinds ({0}) for the cell alphabet")]
    TooManyTileKinds(usize),

    /// Tile list is empty.
    #[error("no tile kinds given")]
    NoTileKinds,

    /// Fewer than three dot-separated sections.
    #[error("malformed tile grid header")]
    MalformedHeader,

    /// Row or column count is not a number.
    #[error("invalid grid dimension: {0:?}")]
    InvalidDimension(String),

    /// Cell count does not match `rows * cols`.
    #[error("expected {expected} cells, found {found}")]
    CellCountMismatch {
        /// rows * cols
        expected: usize,
        /// Cells present
        found: usize,
    },

    /// Cell character outside the alphabet.
    #[error("invalid cell character {0:?}")]
    InvalidCell(char),

    /// Cell index outside the alphabet.
    #[error("cell index {0} outside the alphabet")]
    CellOutOfAlphabet(u8),
}

// =============================================================================
// TILE GRID
// =============================================================================

/// Parsed level grid: one alphabet index per cell, row-major.
///
/// Serialises as its text form, so deserialising goes through [`TileGrid::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// Build a grid from raw cell indices.
    pub fn new(rows: usize, cols: usize, cells: Vec<TileKind>) -> Result<Self, TileMapError> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| TileMapError::InvalidDimension(format!("{rows}x{cols}")))?;
        if cells.len() != expected {
            return Err(TileMapError::CellCountMismatch { expected, found: cells.len() });
        }
        if let Some(bad) = cells.iter().find(|c| **c as usize >= TILE_ALPHABET.len()) {
            return Err(TileMapError::CellOutOfAlphabet(*bad));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Parse the `rows.cols.cells` text format.
    pub fn parse(src: &str) -> Result<Self, TileMapError> {
        let mut parts = src.trim().splitn(3, '.');
        let (Some(rows), Some(cols), Some(data)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TileMapError::MalformedHeader);
        };

        let rows = rows
            .trim()
            .parse::<usize>()
            .map_err(|_| TileMapError::InvalidDimension(rows.to_string()))?;
        let cols = cols
            .trim()
            .parse::<usize>()
            .map_err(|_| TileMapError::InvalidDimension(cols.to_string()))?;

        let cells = data
            .chars()
            .map(cell_index)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(rows, cols, cells)
    }

    /// Write back to the text format.
    pub fn encode(&self) -> String {
        let alphabet = TILE_ALPHABET.as_bytes();
        let cells: String = self
            .cells
            .iter()
            .map(|c| alphabet[*c as usize] as char)
            .collect();
        format!("{}.{}.{}", self.rows, self.cols, cells)
    }

    /// Row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at `(row, col)`, if inside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<TileKind> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(col + row * self.cols).copied()
    }
}

impl FromStr for TileGrid {
    type Err = TileMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TileGrid {
    type Error = TileMapError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Self::parse(&src)
    }
}

impl From<TileGrid> for String {
    fn from(grid: TileGrid) -> Self {
        grid.encode()
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn cell_index(c: char) -> Result<TileKind, TileMapError> {
    TILE_ALPHABET
        .find(c)
        .map(|i| i as TileKind)
        .ok_or(TileMapError::InvalidCell(c))
}

// =============================================================================
// TILE MAP
// =============================================================================

/// A collidable tile, positioned in world units before the scroll offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Tile kind
    pub value: TileKind,
    /// Left edge (pre-offset)
    pub x: f64,
    /// Top edge (pre-offset)
    pub y: f64,
}

/// One tile overlapping a queried box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    /// Tile side hit, or `None` if no rule matched
    pub side: Option<Side>,
    /// Tile kind
    pub tile_value: TileKind,
    /// Tile left edge (post-offset)
    pub x: f64,
    /// Tile top edge (post-offset)
    pub y: f64,
    /// Tile width
    pub w: f64,
    /// Tile height
    pub h: f64,
}

impl CollisionResult {
    /// Tile bounds as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Collidable tiles of one level screen plus its scroll offset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    rows: usize,
    cols: usize,
    tile_w: f64,
    tile_h: f64,
    valid_tiles: Vec<Tile>,
    offset_x: f64,
    offset_y: f64,
    threshold: f64,
}

impl TileMap {
    /// Build the valid-tile list from `grid`.
    ///
    /// `tile_kinds` is the length of the caller's tile list. It must be
    /// non-empty and smaller than the alphabet.
    pub fn new(grid: &TileGrid, tile_kinds: usize, tile_size: (f64, f64)) -> Result<Self, TileMapError> {
        if tile_kinds >= TILE_ALPHABET.len() {
            return Err(TileMapError::TooManyTileKinds(tile_kinds));
        }
        if tile_kinds == 0 {
            return Err(TileMapError::NoTileKinds);
        }

        let (tile_w, tile_h) = tile_size;
        let mut valid_tiles = Vec::new();
        let mut skipped = 0usize;

        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let value = grid.cells[col + row * grid.cols];
                if value == EMPTY_CELL {
                    continue;
                }
                if value as usize > tile_kinds {
                    skipped += 1;
                    continue;
                }
                valid_tiles.push(Tile {
                    value,
                    x: col as f64 * tile_w,
                    y: row as f64 * tile_h,
                });
            }
        }

        if valid_tiles.is_empty() && skipped > 0 {
            warn!(skipped, tile_kinds, "tile grid has cells but none map to a tile kind");
        }
        debug!(
            rows = grid.rows,
            cols = grid.cols,
            valid = valid_tiles.len(),
            skipped,
            "built tile map"
        );

        Ok(Self {
            rows: grid.rows,
            cols: grid.cols,
            tile_w,
            tile_h,
            valid_tiles,
            offset_x: 0.0,
            offset_y: 0.0,
            threshold: DEFAULT_COLLISION_THRESHOLD,
        })
    }

    /// Replace the narrow-phase edge threshold.
    pub fn with_collision_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the scroll offset applied to every tile at query time.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Current scroll offset.
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Collidable tiles in load order.
    pub fn valid_tiles(&self) -> &[Tile] {
        &self.valid_tiles
    }

    /// Tile size as `(width, height)`.
    pub fn tile_size(&self) -> (f64, f64) {
        (self.tile_w, self.tile_h)
    }

    /// Row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Narrow-phase edge threshold.
    pub fn collision_threshold(&self) -> f64 {
        self.threshold
    }

    /// Map width in world units.
    pub fn pixel_width(&self) -> f64 {
        self.cols as f64 * self.tile_w
    }

    /// Map height in world units.
    pub fn pixel_height(&self) -> f64 {
        self.rows as f64 * self.tile_h
    }

    /// All tiles overlapping `rect`, each tagged with the side hit.
    ///
    /// Flat scan over the valid tiles in load order.
    pub fn query_collisions(&self, rect: &Rect, velocity: Vector2) -> Vec<CollisionResult> {
        let mut colliding = Vec::new();

        for tile in &self.valid_tiles {
            let tile_rect = Rect::new(
                tile.x + self.offset_x,
                tile.y + self.offset_y,
                self.tile_w,
                self.tile_h,
            );

            if !overlaps(&tile_rect, rect) {
                continue;
            }

            colliding.push(CollisionResult {
                side: self.impact_side(&tile_rect, rect, velocity),
                tile_value: tile.value,
                x: tile_rect.x,
                y: tile_rect.y,
                w: tile_rect.w,
                h: tile_rect.h,
            });
        }

        colliding
    }

    /// Edge proximity + velocity sign. Order matters: top wins over the
    /// sides for corner contacts while falling.
    fn impact_side(&self, tile: &Rect, rect: &Rect, velocity: Vector2) -> Option<Side> {
        let t = self.threshold;

        if (tile.y - (rect.y + rect.h)).abs() <= t && velocity.y >= 0.0 {
            Some(Side::Top)
        } else if ((tile.x + tile.w) - rect.x).abs() <= t && velocity.x <= 0.0 {
            Some(Side::Right)
        } else if (tile.x - (rect.x + rect.w)).abs() <= t && velocity.x >= 0.0 {
            Some(Side::Left)
        } else if ((tile.y + tile.h) - rect.y).abs() <= t && velocity.y < 0.0 {
            Some(Side::Bottom)
        } else {
            None
        }
    }

    /// True if a tile's (offset) top-left corner is exactly `(x, y)` and its
    /// kind is not in `ignore`.
    pub fn tile_at(&self, x: f64, y: f64, ignore: &[TileKind]) -> bool {
        self.valid_tiles.iter().any(|tile| {
            tile.x + self.offset_x == x
                && tile.y + self.offset_y == y
                && !ignore.contains(&tile.value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TS: (f64, f64) = (16.0, 16.0);

    /// 3x4 grid with a floor on the bottom row and one block at (1, 3).
    fn level() -> TileMap {
        let grid = TileGrid::parse("3.4.000000011111").unwrap();
        TileMap::new(&grid, 2, TS).unwrap()
    }

    #[test]
    fn test_parse_grid() {
        let grid: TileGrid = "2.3.0a1\n0z2".replace('\n', "").parse().unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(0, 1), Some(10));
        assert_eq!(grid.get(1, 1), Some(35));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.encode(), "2.3.0a10z2");
    }

    #[test]
    fn test_parse_grid_errors() {
        assert_eq!(TileGrid::parse("3.4"), Err(TileMapError::MalformedHeader));
        assert_eq!(
            TileGrid::parse("x.4.0000"),
            Err(TileMapError::InvalidDimension("x".to_string()))
        );
        assert_eq!(
            TileGrid::parse("2.2.000"),
            Err(TileMapError::CellCountMismatch { expected: 4, found: 3 })
        );
        assert_eq!(TileGrid::parse("1.2.0A"), Err(TileMapError::InvalidCell('A')));
        assert_eq!(
            TileGrid::new(1, 1, vec![36]),
            Err(TileMapError::CellOutOfAlphabet(36))
        );
    }

    #[test]
    fn test_parse_grid_dimension_overflow() {
        assert_eq!(
            TileGrid::parse("4294967296.4294967296.0"),
            Err(TileMapError::InvalidDimension("4294967296x4294967296".to_string()))
        );
        assert!(TileGrid::new(usize::MAX, 2, Vec::new()).is_err());
    }

    #[test]
    fn test_grid_json_is_validated() {
        let grid = TileGrid::parse("2.2.1z02").unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#""2.2.1z02""#);
        assert_eq!(serde_json::from_str::<TileGrid>(&json).unwrap(), grid);

        // Cell count does not match rows * cols
        assert!(serde_json::from_str::<TileGrid>(r#""2.2.1""#).is_err());
        assert!(serde_json::from_str::<TileGrid>(r#""1.1.#""#).is_err());
        // The field layout is not accepted
        assert!(serde_json::from_str::<TileGrid>(r#"{"rows":2,"cols":2,"cells":[1]}"#).is_err());
    }

    #[test]
    fn test_tile_kind_validation() {
        let grid = TileGrid::parse("1.1.1").unwrap();
        assert_eq!(TileMap::new(&grid, 0, TS), Err(TileMapError::NoTileKinds));
        assert_eq!(TileMap::new(&grid, 36, TS), Err(TileMapError::TooManyTileKinds(36)));
        assert!(TileMap::new(&grid, 35, TS).is_ok());
    }

    #[test]
    fn test_valid_tiles_skip_empty_and_unknown() {
        // '0' empty, '1' and '2' known, 'z' past the two-kind list
        let grid = TileGrid::parse("2.2.1z02").unwrap();
        let map = TileMap::new(&grid, 2, TS).unwrap();

        assert_eq!(
            map.valid_tiles(),
            &[
                Tile { value: 1, x: 0.0, y: 0.0 },
                Tile { value: 2, x: 16.0, y: 16.0 },
            ]
        );
        assert_eq!(map.pixel_width(), 32.0);
        assert_eq!(map.pixel_height(), 32.0);
    }

    #[test]
    fn test_falling_onto_tile_resolves_top() {
        let map = level();
        // Feet 2 units into the floor at y = 32
        let player = Rect::new(2.0, 18.0, 12.0, 16.0);

        let hits = map.query_collisions(&player, Vector2::new(0.0, 5.0));

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].side, Some(Side::Top));
        assert_eq!(hits[0].tile_value, 1);
        assert_eq!(hits[0].rect(), Rect::new(0.0, 32.0, 16.0, 16.0));
    }

    #[test]
    fn test_moving_left_into_tile_resolves_right() {
        let map = level();
        // Tile (1, 3) spans x 48..64, y 16..32. Entity is to its right,
        // left edge pushed 2 units into the tile, floating above the floor.
        let player = Rect::new(62.0, 17.0, 12.0, 10.0);

        let hits = map.query_collisions(&player, Vector2::new(-3.0, 0.0));

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].side, Some(Side::Right));
        assert_eq!(hits[0].tile_value, 1);
    }

    #[test]
    fn test_moving_right_into_tile_resolves_left() {
        let map = level();
        let player = Rect::new(38.0, 17.0, 12.0, 10.0);

        let hits = map.query_collisions(&player, Vector2::new(3.0, 0.0));

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].side, Some(Side::Left));
    }

    #[test]
    fn test_jumping_into_tile_resolves_bottom() {
        let map = level();
        // Head 2 units into the underside of tile (1, 3). The box also
        // reaches into the floor tile below it.
        let player = Rect::new(50.0, 30.0, 12.0, 10.0);

        let hits = map.query_collisions(&player, Vector2::new(0.0, -4.0));

        let block = hits.iter().find(|h| h.y == 16.0).unwrap();
        assert_eq!(block.side, Some(Side::Bottom));
    }

    #[test]
    fn test_top_wins_corner_contact() {
        let map = level();
        // Bottom-right corner of the box touches the top-left of tile (1, 3):
        // both the top and left rules match, top is checked first.
        let player = Rect::new(37.0, 1.0, 12.0, 16.0);

        let hits = map.query_collisions(&player, Vector2::new(1.0, 1.0));

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].side, Some(Side::Top));
    }

    #[test]
    fn test_deep_overlap_reports_no_side() {
        let map = level();
        // Box sits in the middle of the floor tile far from every edge
        let player = Rect::new(20.0, 39.0, 8.0, 2.0);

        let hits = map.query_collisions(&player, Vector2::new(0.0, 1.0));

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].side, None);
    }

    #[test]
    fn test_tile_at() {
        let mut map = level();
        assert!(map.tile_at(48.0, 16.0, &[]));
        assert!(!map.tile_at(48.0, 16.0, &[1]));
        assert!(!map.tile_at(47.0, 16.0, &[]));

        map.set_offset(-16.0, 0.0);
        assert!(map.tile_at(32.0, 16.0, &[]));
        assert!(!map.tile_at(48.0, 16.0, &[]));
    }

    #[test]
    fn test_offset_moves_results() {
        let mut map = level();
        let player = Rect::new(2.0, 18.0, 12.0, 16.0);
        let before = map.query_collisions(&player, Vector2::new(0.0, 5.0));

        map.set_offset(100.0, 0.0);
        assert!(map.query_collisions(&player, Vector2::new(0.0, 5.0)).is_empty());

        let after = map.query_collisions(&player.translated(100.0, 0.0), Vector2::new(0.0, 5.0));
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0].x, before[0].x + 100.0);
        assert_eq!(after[0].side, before[0].side);
    }

    proptest! {
        #[test]
        fn prop_offset_invariance(
            x in -40i32..100,
            y in -40i32..60,
            w in 1i32..30,
            h in 1i32..30,
            vx in -8i32..8,
            vy in -8i32..8,
            dx in -500i32..500,
        ) {
            let map = level();
            let rect = Rect::new(x as f64, y as f64, w as f64, h as f64);
            let vel = Vector2::new(vx as f64, vy as f64);
            let base = map.query_collisions(&rect, vel);

            let mut shifted = map.clone();
            shifted.set_offset(dx as f64, 0.0);
            let moved = shifted.query_collisions(&rect.translated(dx as f64, 0.0), vel);

            prop_assert_eq!(base.len(), moved.len());
            for (a, b) in base.iter().zip(moved.iter()) {
                prop_assert_eq!(a.side, b.side);
                prop_assert_eq!(a.tile_value, b.tile_value);
                prop_assert_eq!(a.x + dx as f64, b.x);
                prop_assert_eq!(a.y, b.y);
            }
        }
    }
}
