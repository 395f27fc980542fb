/// GameState: the complete snapshot of a running game.
///
/// One value, owned by the loop and mutated only through `sim::step::update`.
/// The renderer borrows it read-only after the tick has returned.
///
/// ## Clocks
///   - `tick`:  game clock, +1 per update while the world runs (Playing and
///               the player alive). Fire marks and the clear mark live here.
///   - `frame`: +1 per update in every scene. Scene timers count frames.
///
/// Entities are stored in fixed-capacity vectors and deactivated in place;
/// they refer to each other only by index.

use crate::config::Tuning;
use crate::domain::consts::{
    GHOST_MODE_THRESHOLD, MAX_ENEMIES, MAX_ROCKS, MAX_SCORE, PLAYER_SPEED_LIMIT,
};
use crate::domain::entity::{Enemy, EnemyKind, Player, PlayerState, Rock};
use crate::domain::map::Map;
use crate::domain::pathfinder::Pathfinder;

use super::event::{DeathCause, GameEvent, KillCause};

/// Per-tick event buffer size; reserved once so ticks never allocate.
const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Scene {
    Menu,
    RoundStart,
    Playing,
    Paused,
    RoundClear,
    GameOver,
    Victory,
    Credits,
}

pub struct GameState {
    // ── Meta ──
    pub scene: Scene,
    pub score: u32,
    pub high_score: u32,
    pub round: u32,
    pub lives: u32,
    pub tick: u32,
    pub frame: u32,
    pub scene_timer: u32,
    pub enemies_cleared_mark: Option<u32>,
    pub exit_requested: bool,

    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub rocks: Vec<Rock>,
    pub live_enemies: usize,

    // ── Round ──
    pub map: Map,
    pub ghost_threshold: u32,

    // ── Scratch / config ──
    pub pathfinder: Pathfinder,
    pub tuning: Tuning,
    pub events: Vec<GameEvent>,
}

// ── Construction ──

impl GameState {
    pub fn new(tuning: Tuning) -> Self {
        GameState {
            scene: Scene::Menu,
            score: 0,
            high_score: 0,
            round: 0,
            lives: 0,
            tick: 0,
            frame: 0,
            scene_timer: 0,
            enemies_cleared_mark: None,
            exit_requested: false,
            player: Player::new(0, 0, PLAYER_SPEED_LIMIT),
            enemies: Vec::with_capacity(MAX_ENEMIES),
            rocks: Vec::with_capacity(MAX_ROCKS),
            live_enemies: 0,
            map: Map::new(),
            ghost_threshold: GHOST_MODE_THRESHOLD,
            pathfinder: Pathfinder::new(),
            tuning,
            events: Vec::with_capacity(EVENT_CAPACITY),
        }
    }

    /// Add an enemy unless the roster is full. Returns its index.
    pub fn spawn_enemy(&mut self, x: i32, y: i32, kind: EnemyKind, speed_bonus: u32) -> Option<usize> {
        if self.enemies.len() >= MAX_ENEMIES {
            return None;
        }
        let mut e = Enemy::new(x, y, kind, speed_bonus);
        e.fire.end_tick = self.tick;
        self.enemies.push(e);
        self.live_enemies += 1;
        Some(self.enemies.len() - 1)
    }

    pub fn spawn_rock(&mut self, x: i32, y: i32) -> Option<usize> {
        if self.rocks.len() >= MAX_ROCKS {
            return None;
        }
        self.rocks.push(Rock::new(x, y));
        Some(self.rocks.len() - 1)
    }
}

// ── Queries ──

impl GameState {
    pub fn rock_blocks_player(&self, x: i32, y: i32) -> bool {
        self.rocks.iter().any(|r| r.x == x && r.y == y && r.blocks_player())
    }

    pub fn rock_blocks_enemy(&self, x: i32, y: i32) -> bool {
        self.rocks.iter().any(|r| r.x == x && r.y == y && r.blocks_enemy())
    }

    pub fn count_live_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_live()).count()
    }
}

// ── Mutation helpers shared by the step modules ──

impl GameState {
    /// Scores only go up and saturate at MAX_SCORE.
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points).min(MAX_SCORE);
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn set_scene(&mut self, to: Scene) {
        if self.scene != to {
            let from = self.scene;
            self.scene = to;
            self.push_event(GameEvent::SceneChanged { from, to });
        }
    }

    /// Kill enemy `id` once, awarding `points`. Calls on a dead enemy are ignored.
    pub fn kill_enemy(&mut self, id: usize, points: u32, cause: KillCause) {
        let Some(e) = self.enemies.get_mut(id) else { return };
        if !e.is_live() {
            return;
        }
        e.kill();
        let (x, y) = (e.x, e.y);
        self.live_enemies = self.live_enemies.saturating_sub(1);
        self.add_score(points);
        self.push_event(GameEvent::EnemyKilled { id, x, y, points, cause });
    }

    /// Player death: one life is spent. With lives left the respawn timer
    /// starts; otherwise the game is over.
    pub fn kill_player(&mut self, cause: DeathCause) {
        if !self.player.is_alive() {
            return;
        }
        self.player.retract_pump();
        self.player.attacking = false;
        self.player.attack_timer = 0;
        self.player.state = PlayerState::Dead;
        self.lives = self.lives.saturating_sub(1);
        self.push_event(GameEvent::PlayerKilled {
            x: self.player.x,
            y: self.player.y,
            cause,
            lives_left: self.lives,
        });
        if self.lives == 0 {
            self.set_scene(Scene::GameOver);
        } else {
            self.scene_timer = self.tuning.respawn_delay;
        }
    }
}

#[cfg(test)]
impl GameState {
    /// A bare Playing state for tests: earth is solid dirt with no pebbles,
    /// no enemies or rocks, player at the usual start cell.
    pub fn arena() -> Self {
        use crate::domain::consts::{LAYER_ROWS, MAP_WIDTH};
        use crate::domain::tile::TileKind;

        let mut s = GameState::new(Tuning::default());
        s.map.init(0);
        for y in LAYER_ROWS[0].0..=LAYER_ROWS[3].1 {
            for x in 0..MAP_WIDTH {
                s.map.set_tile(x as i32, y as i32, TileKind::Dirt);
            }
        }
        s.round = 1;
        s.lives = s.tuning.initial_lives;
        s.player = Player::new(10, 2, PLAYER_SPEED_LIMIT);
        s.scene = Scene::Playing;
        s
    }

    /// Open a horizontal run of Empty cells, inclusive.
    pub fn open_row(&mut self, y: i32, x1: i32, x2: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.map.set_tile(x, y, crate::domain::tile::TileKind::Empty);
        }
    }

    pub fn place_enemy(&mut self, x: i32, y: i32, kind: EnemyKind) -> usize {
        self.open_row(y, x, x);
        self.spawn_enemy(x, y, kind, 0).expect("roster has room")
    }
}
