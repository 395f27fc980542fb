//! Fixed layout and capacity constants.
//!
//! Everything here is compile-time: grid geometry, array capacities and the
//! earth layer table. Timing and balance values that a player may want to
//! tune live in `config::Tuning` instead.

// ── Grid ──

pub const MAP_WIDTH: usize = 80;
pub const MAP_HEIGHT: usize = 25;
pub const SCREEN_CELLS: usize = MAP_WIDTH * MAP_HEIGHT;

pub const ROW_STATUS_TOP: usize = 0;
pub const ROW_SKY_START: usize = 1;
pub const ROW_SKY_END: usize = 2;
pub const ROW_BORDER: usize = 23;
pub const ROW_STATUS_BOTTOM: usize = 24;

/// Earth layers as inclusive row ranges, top to bottom.
pub const LAYER_ROWS: [(usize, usize); 4] = [(3, 7), (8, 12), (13, 17), (18, 22)];
pub const LAYER_POINTS: [u32; 4] = [200, 300, 400, 500];

// ── Capacities ──

pub const MAX_ENEMIES: usize = 8;
pub const MAX_ROCKS: usize = 8;
pub const MAX_ROUNDS: u32 = 8;
pub const MAX_SCORE: u32 = 999_999;

// ── Entities ──

pub const MAX_PUMP_LENGTH: usize = 3;
pub const INFLATE_LEVELS: u8 = 4;

pub const PLAYER_SPEED_LIMIT: u32 = 3;
pub const POOKA_SPEED_LIMIT: u32 = 8;
pub const FYGAR_SPEED_LIMIT: u32 = 10;
pub const MIN_ENEMY_SPEED_LIMIT: u32 = 2;

pub const PARALYZE_BLINKS: u8 = 10;
pub const PARALYZE_BLINK_TICKS: u8 = 5;
pub const ATTACK_TICKS: u32 = 8;

pub const BONUS_POINTS: u32 = 100;
pub const GEM_POINTS: u32 = 50;

/// Default stuck-step count before an enemy turns into a ghost.
/// Individual levels lower it as rounds get harder.
pub const GHOST_MODE_THRESHOLD: u32 = 40;

// ── Clocks ──

/// Raw tick source rate (milliseconds).
pub const BASE_TICKS_PER_SECOND: u32 = 1000;
pub const TARGET_FPS: u32 = 60;
