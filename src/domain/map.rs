//! The playfield: a fixed 80×25 tile grid.
//!
//! Rows are partitioned into bands:
//!
//! ```text
//!   0        status (HUD)
//!   1..=2    sky
//!   3..=22   earth, four layers (see LAYER_ROWS)
//!   23       border
//!   24       status (HUD)
//! ```
//!
//! All queries accept signed coordinates. Anything off the grid reads as
//! `TileKind::Invalid`; writes off the grid are dropped.

use super::consts::{
    LAYER_POINTS, LAYER_ROWS, MAP_HEIGHT, MAP_WIDTH, ROW_BORDER, ROW_SKY_END, ROW_SKY_START,
};
use super::tile::TileKind;

#[derive(Clone, Debug)]
pub struct Map {
    tiles: [[TileKind; MAP_WIDTH]; MAP_HEIGHT],
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Map { tiles: [[TileKind::Sky; MAP_WIDTH]; MAP_HEIGHT] }
    }

    #[inline]
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < MAP_WIDTH && (y as usize) < MAP_HEIGHT
    }

    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> TileKind {
        if self.is_valid(x, y) {
            self.tiles[y as usize][x as usize]
        } else {
            TileKind::Invalid
        }
    }

    #[inline]
    pub fn set_tile(&mut self, x: i32, y: i32, tile: TileKind) {
        if tile == TileKind::Invalid || !self.is_valid(x, y) {
            return;
        }
        self.tiles[y as usize][x as usize] = tile;
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_walkable()
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_solid()
    }

    pub fn is_diggable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_diggable()
    }

    /// Dirt becomes Empty. Any other tile is left alone.
    /// Returns true if something was dug.
    pub fn dig(&mut self, x: i32, y: i32) -> bool {
        if self.is_diggable(x, y) {
            self.set_tile(x, y, TileKind::Empty);
            true
        } else {
            false
        }
    }

    pub fn has_gem(&self, x: i32, y: i32) -> bool {
        self.tile(x, y) == TileKind::Gem
    }

    pub fn remove_gem(&mut self, x: i32, y: i32) -> bool {
        if self.has_gem(x, y) {
            self.set_tile(x, y, TileKind::Empty);
            true
        } else {
            false
        }
    }

    /// Consume a Gem or Bonus at (x, y), leaving Empty behind.
    pub fn take_pickup(&mut self, x: i32, y: i32) -> Option<TileKind> {
        let t = self.tile(x, y);
        if t.is_pickup() {
            self.set_tile(x, y, TileKind::Empty);
            Some(t)
        } else {
            None
        }
    }

    /// Force a cell open (tunnel carving). The border row is never carved.
    pub fn carve(&mut self, x: i32, y: i32) {
        if y as usize >= ROW_BORDER || (y as usize) < ROW_SKY_START {
            return;
        }
        if matches!(self.tile(x, y), TileKind::Dirt | TileKind::Wall) {
            self.set_tile(x, y, TileKind::Empty);
        }
    }

    /// Fill sky, earth layers and the border row for a fresh round.
    /// Status rows keep whatever they hold. A few round-dependent Wall
    /// pebbles are scattered through the earth.
    pub fn init(&mut self, round: u32) {
        for y in ROW_SKY_START..=ROW_SKY_END {
            self.tiles[y] = [TileKind::Sky; MAP_WIDTH];
        }
        for &(top, bottom) in &LAYER_ROWS {
            for y in top..=bottom {
                self.tiles[y] = [TileKind::Dirt; MAP_WIDTH];
            }
        }
        self.tiles[ROW_BORDER] = [TileKind::Border; MAP_WIDTH];

        let earth_top = LAYER_ROWS[0].0 as u32;
        let earth_rows = (LAYER_ROWS[3].1 - LAYER_ROWS[0].0 + 1) as u32;
        let pebbles = 2 + round.min(6);
        for i in 0..pebbles {
            let x = (7 + i * 17 + round * 11) % (MAP_WIDTH as u32 - 4) + 2;
            let y = earth_top + (i * 5 + round * 3) % earth_rows;
            self.set_tile(x as i32, y as i32, TileKind::Wall);
        }
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().flatten().filter(|&&t| t == kind).count()
    }
}

// ── Layer table ──

/// Earth layer index (0..4) for a row, if the row is earth.
pub fn layer_of_row(y: i32) -> Option<usize> {
    if y < 0 {
        return None;
    }
    let y = y as usize;
    LAYER_ROWS.iter().position(|&(top, bottom)| y >= top && y <= bottom)
}

/// Points for a kill at row y. Anything above the earth counts as layer 1,
/// anything below as layer 4.
pub fn layer_points(y: i32) -> u32 {
    match layer_of_row(y) {
        Some(layer) => LAYER_POINTS[layer],
        None if y < LAYER_ROWS[0].0 as i32 => LAYER_POINTS[0],
        None => LAYER_POINTS[LAYER_POINTS.len() - 1],
    }
}
