/// Level catalog and round loader.
///
/// Five hand-made rounds. Every round starts from `Map::init` (sky, four
/// dirt layers, border row, a few wall pebbles), then carves its tunnels and
/// drops its pickups. Rounds past the last entry replay it with faster enemies.
///
/// Tunnels are L-shaped rasters: horizontal along the start row until the
/// column matches, then vertical along the end column.

use tracing::debug;

use crate::domain::consts::PLAYER_SPEED_LIMIT;
use crate::domain::entity::{EnemyKind, Player};
use crate::domain::map::Map;
use crate::domain::tile::TileKind;
use crate::sim::world::GameState;

pub struct EnemySpawn {
    pub x: i32,
    pub y: i32,
    pub kind: EnemyKind,
}

pub struct Tunnel {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

pub struct LevelDef {
    pub player_start: (i32, i32),
    pub enemies: &'static [EnemySpawn],
    pub rocks: &'static [(i32, i32)],
    pub tunnels: &'static [Tunnel],
    pub bonuses: [(i32, i32); 3],
    pub gems: &'static [(i32, i32)],
    pub ghost_threshold: u32,
}

const fn pooka(x: i32, y: i32) -> EnemySpawn {
    EnemySpawn { x, y, kind: EnemyKind::Pooka }
}

const fn fygar(x: i32, y: i32) -> EnemySpawn {
    EnemySpawn { x, y, kind: EnemyKind::Fygar }
}

const fn tunnel(x1: i32, y1: i32, x2: i32, y2: i32) -> Tunnel {
    Tunnel { from: (x1, y1), to: (x2, y2) }
}

// ══════════════════════════════════════════════════════════════
// Catalog
// ══════════════════════════════════════════════════════════════

pub static LEVELS: [LevelDef; 5] = [
    // 1: three short tunnels, one Fygar
    LevelDef {
        player_start: (10, 2),
        enemies: &[pooka(24, 6), pooka(52, 14), fygar(64, 16)],
        rocks: &[(40, 5), (16, 13), (60, 9)],
        tunnels: &[
            tunnel(18, 6, 32, 6),
            tunnel(52, 11, 52, 18),
            tunnel(58, 16, 70, 16),
        ],
        bonuses: [(30, 6), (52, 17), (68, 16)],
        gems: &[(8, 10), (44, 20)],
        ghost_threshold: 40,
    },
    // 2
    LevelDef {
        player_start: (10, 2),
        enemies: &[pooka(14, 8), fygar(34, 10), pooka(50, 14), fygar(66, 12)],
        rocks: &[(20, 11), (45, 12), (72, 9)],
        tunnels: &[
            tunnel(10, 8, 26, 8),
            tunnel(34, 4, 34, 12),
            tunnel(40, 14, 60, 20),
            tunnel(66, 5, 66, 20),
        ],
        bonuses: [(24, 8), (60, 18), (66, 18)],
        gems: &[(6, 18), (38, 20), (75, 4)],
        ghost_threshold: 35,
    },
    // 3
    LevelDef {
        player_start: (10, 2),
        enemies: &[pooka(12, 5), fygar(22, 12), pooka(36, 19), fygar(50, 12), pooka(68, 7)],
        rocks: &[(14, 9), (28, 4), (40, 16), (62, 11)],
        tunnels: &[
            tunnel(6, 5, 22, 15),
            tunnel(30, 19, 50, 9),
            tunnel(58, 7, 74, 12),
        ],
        bonuses: [(18, 5), (44, 19), (74, 10)],
        gems: &[(4, 20), (30, 10), (56, 21)],
        ghost_threshold: 30,
    },
    // 4
    LevelDef {
        player_start: (10, 2),
        enemies: &[
            fygar(12, 4), pooka(30, 14), pooka(50, 9),
            fygar(44, 19), pooka(64, 17), fygar(70, 8),
        ],
        rocks: &[(20, 7), (38, 12), (56, 14), (76, 8)],
        tunnels: &[
            tunnel(4, 4, 30, 21),
            tunnel(38, 9, 60, 9),
            tunnel(44, 13, 44, 21),
            tunnel(52, 17, 76, 17),
            tunnel(70, 5, 70, 17),
        ],
        bonuses: [(24, 4), (44, 16), (74, 17)],
        gems: &[(8, 16), (36, 20), (62, 3)],
        ghost_threshold: 25,
    },
    // 5: the replay round
    LevelDef {
        player_start: (10, 2),
        enemies: &[
            pooka(24, 6), fygar(12, 15), pooka(32, 20), fygar(50, 20),
            pooka(60, 8), fygar(56, 11), pooka(72, 16),
        ],
        rocks: &[(30, 9), (18, 17), (48, 14), (66, 8), (40, 17)],
        tunnels: &[
            tunnel(6, 6, 36, 6),
            tunnel(12, 6, 12, 20),
            tunnel(20, 20, 60, 4),
            tunnel(44, 11, 72, 19),
        ],
        bonuses: [(34, 6), (60, 14), (72, 18)],
        gems: &[(4, 12), (26, 14), (76, 22)],
        ghost_threshold: 20,
    },
];

/// Level for a 1-based round, plus the enemy speed bonus for replays.
pub fn level_for_round(round: u32) -> (&'static LevelDef, u32) {
    let defined = LEVELS.len() as u32;
    let idx = round.clamp(1, defined) as usize - 1;
    (&LEVELS[idx], round.saturating_sub(defined))
}

/// Carve an L-shaped tunnel: along `from.y` to `to.x`, then along `to.x` to `to.y`.
pub fn carve_tunnel(map: &mut Map, t: &Tunnel) {
    let (x1, y1) = t.from;
    let (x2, y2) = t.to;
    let sx = (x2 - x1).signum();
    let sy = (y2 - y1).signum();

    let mut x = x1;
    loop {
        map.carve(x, y1);
        if x == x2 { break; }
        x += sx;
    }
    let mut y = y1;
    loop {
        map.carve(x2, y);
        if y == y2 { break; }
        y += sy;
    }
}

// ══════════════════════════════════════════════════════════════
// Loader
// ══════════════════════════════════════════════════════════════

/// Build the map and roster for `round`. Score, lives and clocks are kept.
pub fn load_round(state: &mut GameState, round: u32) {
    let (def, speed_bonus) = level_for_round(round);
    state.round = round;
    state.ghost_threshold = def.ghost_threshold;
    state.enemies_cleared_mark = None;

    state.map.init(round);
    for t in def.tunnels {
        carve_tunnel(&mut state.map, t);
    }

    let (px, py) = def.player_start;
    state.player = Player::new(px, py, PLAYER_SPEED_LIMIT);

    state.enemies.clear();
    state.live_enemies = 0;
    let mut dropped = 0;
    for s in def.enemies {
        state.map.carve(s.x, s.y);
        if state.spawn_enemy(s.x, s.y, s.kind, speed_bonus).is_none() {
            dropped += 1;
        }
    }

    state.rocks.clear();
    for &(x, y) in def.rocks {
        state.map.carve(x, y);
        if state.spawn_rock(x, y).is_none() {
            dropped += 1;
        }
    }

    for &(x, y) in &def.bonuses {
        state.map.set_tile(x, y, TileKind::Bonus);
    }
    for &(x, y) in def.gems {
        state.map.set_tile(x, y, TileKind::Gem);
    }

    if dropped > 0 {
        debug!(round, dropped, "spawns_over_capacity");
    }
}
